// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::core::store::io::{BufferedIndexInput, BufferedInput, IndexInput, BUFFER_SIZE};
use crate::error::Error;
use crate::Result;

/// Exposes the window `[file_offset, file_offset + length)` of a base input
/// as a standalone file.
///
/// The slice owns its base: closing the slice closes the base. The base is
/// positioned lazily, on each physical read, so seeking the slice is free.
pub struct SlicedIndexInput {
    base: Box<dyn IndexInput>,
    file_offset: i64,
    length: i64,
}

impl SlicedIndexInput {
    pub fn new(
        description: &str,
        base: Box<dyn IndexInput>,
        file_offset: i64,
        length: i64,
    ) -> Result<BufferedIndexInput<SlicedIndexInput>> {
        Self::with_buffer_size(description, base, file_offset, length, BUFFER_SIZE)
    }

    pub fn with_buffer_size(
        description: &str,
        base: Box<dyn IndexInput>,
        file_offset: i64,
        length: i64,
        buffer_size: usize,
    ) -> Result<BufferedIndexInput<SlicedIndexInput>> {
        if file_offset < 0 || length < 0 || file_offset as u64 + length as u64 > base.len() {
            return Err(Error::IllegalArgument(format!(
                "slice out of bounds: offset={}, length={}, fileLength={}: {}",
                file_offset,
                length,
                base.len(),
                base
            )));
        }
        let description = format!(
            "SlicedIndexInput({} in {} slice={}:{})",
            description,
            base,
            file_offset,
            file_offset + length
        );
        let slice = SlicedIndexInput {
            base,
            file_offset,
            length,
        };
        BufferedIndexInput::with_buffer_size(description, slice, buffer_size)
    }

    pub fn file_offset(&self) -> i64 {
        self.file_offset
    }
}

impl BufferedInput for SlicedIndexInput {
    fn read_internal(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        let in_window = pos
            .checked_add(buf.len() as i64)
            .map_or(false, |end| end <= self.length);
        if !in_window {
            return Err(Error::UnexpectedEOF(format!(
                "read past EOF: {} slice={}:{} (pos={}, requested={})",
                self.base,
                self.file_offset,
                self.file_offset + self.length,
                pos,
                buf.len()
            )));
        }
        self.base.seek(self.file_offset + pos)?;
        self.base.read_bytes_buffered(buf, false)
    }

    fn seek_internal(&mut self, _pos: i64) -> Result<()> {
        Ok(())
    }

    fn length(&self) -> u64 {
        self.length as u64
    }

    fn close(&mut self) -> Result<()> {
        self.base.close()
    }

    fn try_clone(&self) -> Result<Self> {
        Ok(SlicedIndexInput {
            base: self.base.clone_input()?,
            file_offset: self.file_offset,
            length: self.length,
        })
    }
}
