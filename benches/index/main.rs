#![feature(test)]

use test::Bencher;

extern crate rucene_store;
extern crate test;

use std::sync::Arc;

use rucene_store::core::store::io::{
    BufferedIndexInput, BufferedInput, DataInput, IndexInput, SlicedIndexInput,
};
use rucene_store::core::util::{pop_array, ZigZagEncoding};
use rucene_store::error::{Error, Result};

struct MemorySource {
    data: Arc<Vec<u8>>,
}

impl BufferedInput for MemorySource {
    fn read_internal(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        let start = pos as usize;
        let end = start + buf.len();
        if end > self.data.len() {
            return Err(Error::UnexpectedEOF(format!("{}..{}", start, end)));
        }
        buf.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    fn seek_internal(&mut self, _pos: i64) -> Result<()> {
        Ok(())
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn try_clone(&self) -> Result<Self> {
        Ok(MemorySource {
            data: Arc::clone(&self.data),
        })
    }
}

fn memory_input(len: usize) -> BufferedIndexInput<MemorySource> {
    let data: Vec<u8> = (0..len).map(|i| (i % 127) as u8).collect();
    BufferedIndexInput::new(
        "bench".into(),
        MemorySource {
            data: Arc::new(data),
        },
    )
}

#[bench]
fn read_vints_through_slice(b: &mut Bencher) {
    let base = memory_input(1 << 20);
    let mut slice = SlicedIndexInput::new("postings", Box::new(base), 4096, 1 << 19).unwrap();
    b.iter(|| {
        slice.seek(0).unwrap();
        let mut sum = 0i64;
        while slice.file_pointer() < 1 << 19 {
            sum += slice.read_vint().unwrap() as i64;
        }
        sum
    });
}

#[bench]
fn clone_and_seek(b: &mut Bencher) {
    let base = memory_input(1 << 16);
    b.iter(|| {
        let mut clone = base.clone_input().unwrap();
        clone.seek(1 << 15).unwrap();
        clone.read_long().unwrap()
    });
}

#[bench]
fn zigzag_and_popcount(b: &mut Bencher) {
    let words: Vec<i64> = (0..1024i64).map(|i| (i * 0x9E37_79B9).encode()).collect();
    b.iter(|| pop_array(&words));
}
