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

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::core::util::ZigZagEncoding;
use crate::error::Error;
use crate::Result;

/// Abstract base for performing write operations of Lucene's low-level
/// data types, the mirror of `DataInput`.
pub trait DataOutput: Write {
    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_u8(b)?;
        Ok(())
    }

    fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        self.write_all(b)?;
        Ok(())
    }

    fn write_short(&mut self, i: i16) -> Result<()> {
        self.write_i16::<BigEndian>(i)?;
        Ok(())
    }

    fn write_int(&mut self, i: i32) -> Result<()> {
        self.write_i32::<BigEndian>(i)?;
        Ok(())
    }

    fn write_long(&mut self, i: i64) -> Result<()> {
        self.write_i64::<BigEndian>(i)?;
        Ok(())
    }

    /// Negative values are supported but always take five bytes.
    fn write_vint(&mut self, i: i32) -> Result<()> {
        write_var_u64(self, u64::from(i as u32))
    }

    fn write_vlong(&mut self, i: i64) -> Result<()> {
        if i < 0 {
            return Err(Error::IllegalArgument(format!(
                "cannot write negative vLong (got: {})",
                i
            )));
        }
        write_var_u64(self, i as u64)
    }

    fn write_zint(&mut self, i: i32) -> Result<()> {
        self.write_vint(i.encode())
    }

    fn write_zlong(&mut self, i: i64) -> Result<()> {
        write_var_u64(self, i.encode() as u64)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        if bytes.len() > i32::MAX as usize {
            return Err(Error::IllegalArgument(format!(
                "string too long to write: {} bytes",
                bytes.len()
            )));
        }
        self.write_vint(bytes.len() as i32)?;
        self.write_bytes(bytes)
    }
}

fn write_var_u64<O: DataOutput + ?Sized>(output: &mut O, mut v: u64) -> Result<()> {
    while v & !0x7f != 0 {
        output.write_byte(((v & 0x7f) | 0x80) as u8)?;
        v >>= 7;
    }
    output.write_byte(v as u8)
}
