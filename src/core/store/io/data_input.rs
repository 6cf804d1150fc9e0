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

use byteorder::{BigEndian, ByteOrder};

use crate::core::util::ZigZagEncoding;
use crate::error::Error;
use crate::Result;

/// Abstract base for performing read operations of Lucene's low-level
/// data types.
///
/// Multi-byte integers are big-endian. Variable-length integers store seven
/// bits per byte, low-order group first, with the high bit of each byte
/// flagging that more bytes follow.
pub trait DataInput {
    fn read_byte(&mut self) -> Result<u8>;

    /// Fills `b` completely or fails.
    fn read_bytes(&mut self, b: &mut [u8]) -> Result<()>;

    fn read_short(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.read_bytes(&mut buf)?;
        Ok(BigEndian::read_i16(&buf))
    }

    fn read_int(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(BigEndian::read_i32(&buf))
    }

    fn read_long(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_bytes(&mut buf)?;
        Ok(BigEndian::read_i64(&buf))
    }

    fn read_vint(&mut self) -> Result<i32> {
        let v = read_var_u64(self, 5)?;
        if v > u64::from(u32::MAX) {
            return Err(Error::CorruptIndex(
                "Invalid vInt detected (too many bits)".into(),
            ));
        }
        Ok(v as u32 as i32)
    }

    /// Reads a non-negative variable-length long, at most 9 bytes.
    fn read_vlong(&mut self) -> Result<i64> {
        Ok(read_var_u64(self, 9)? as i64)
    }

    fn read_zint(&mut self) -> Result<i32> {
        Ok(self.read_vint()?.decode())
    }

    fn read_zlong(&mut self) -> Result<i64> {
        Ok((read_var_u64(self, 10)? as i64).decode())
    }

    /// Reads a vint length followed by that many UTF-8 bytes.
    fn read_string(&mut self) -> Result<String> {
        let length = self.read_vint()?;
        if length < 0 {
            return Err(Error::CorruptIndex(format!(
                "negative string length: {}",
                length
            )));
        }
        let mut buf = vec![0u8; length as usize];
        self.read_bytes(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    fn skip_bytes(&mut self, count: usize) -> Result<()> {
        const SKIP_BUFFER_SIZE: usize = 1024;
        let mut skip_buffer = [0u8; SKIP_BUFFER_SIZE];
        let mut skipped = 0;
        while skipped < count {
            let step = SKIP_BUFFER_SIZE.min(count - skipped);
            self.read_bytes(&mut skip_buffer[..step])?;
            skipped += step;
        }
        Ok(())
    }
}

fn read_var_u64<I: DataInput + ?Sized>(input: &mut I, max_bytes: usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for _ in 0..max_bytes {
        let b = input.read_byte()?;
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(Error::CorruptIndex(format!(
        "Invalid variable-length integer (more than {} bytes)",
        max_bytes
    )))
}
