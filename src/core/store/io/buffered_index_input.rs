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

use std::fmt;

use crate::core::store::io::{DataInput, IndexInput};
use crate::core::store::IOContext;
use crate::error::Error;
use crate::Result;

/// Default buffer size.
pub const BUFFER_SIZE: usize = 1024;

/// Minimum buffer size allowed.
pub const MIN_BUFFER_SIZE: usize = 8;

/// A buffer size for merges.
pub const MERGE_BUFFER_SIZE: usize = 4096;

/// Returns the buffer size to use for inputs opened under `context`.
pub fn buffer_size(context: &IOContext) -> usize {
    if context.is_merge() {
        MERGE_BUFFER_SIZE
    } else {
        BUFFER_SIZE
    }
}

fn check_buffer_size(buffer_size: usize) -> Result<()> {
    if buffer_size < MIN_BUFFER_SIZE {
        return Err(Error::IllegalArgument(format!(
            "buffer_size must be at least MIN_BUFFER_SIZE (got {})",
            buffer_size
        )));
    }
    Ok(())
}

/// The physical reads behind a `BufferedIndexInput`.
///
/// Each concrete reader (a file, a memory region, a slice of another input)
/// implements these hooks; buffering, cursor arithmetic and EOF detection
/// live in `BufferedIndexInput`.
pub trait BufferedInput: Send + Sync + Sized {
    /// Reads exactly `buf.len()` bytes starting at `pos`, the file pointer
    /// of the buffered input at the time of the call.
    fn read_internal(&mut self, pos: i64, buf: &mut [u8]) -> Result<()>;

    /// Called when the buffered input moves to `pos` outside its buffer.
    fn seek_internal(&mut self, pos: i64) -> Result<()>;

    fn length(&self) -> u64;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// An independent reader over the same bytes.
    fn try_clone(&self) -> Result<Self>;
}

/// Base implementation class for buffered `IndexInput`.
pub struct BufferedIndexInput<S: BufferedInput> {
    source: S,
    description: String,
    buffer_size: usize,
    // allocated lazily on first refill
    buffer: Vec<u8>,
    // position in file of buffer
    buffer_start: i64,
    // end of valid bytes
    buffer_length: usize,
    // next byte to read
    buffer_position: usize,
}

impl<S: BufferedInput> BufferedIndexInput<S> {
    pub fn new(description: String, source: S) -> Self {
        Self::build(description, source, BUFFER_SIZE)
    }

    pub fn with_context(description: String, source: S, context: &IOContext) -> Self {
        Self::build(description, source, buffer_size(context))
    }

    pub fn with_buffer_size(description: String, source: S, buffer_size: usize) -> Result<Self> {
        check_buffer_size(buffer_size)?;
        Ok(Self::build(description, source, buffer_size))
    }

    fn build(description: String, source: S, buffer_size: usize) -> Self {
        BufferedIndexInput {
            source,
            description,
            buffer_size,
            buffer: Vec::new(),
            buffer_start: 0,
            buffer_length: 0,
            buffer_position: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Change the buffer size used by this input, keeping the current
    /// position and as many already buffered bytes as fit.
    pub fn set_buffer_size(&mut self, new_size: usize) -> Result<()> {
        if new_size == self.buffer_size {
            return Ok(());
        }
        check_buffer_size(new_size)?;
        self.buffer_size = new_size;
        if !self.buffer.is_empty() {
            let mut new_buffer = vec![0u8; new_size];
            let left_in_buffer = self.buffer_length - self.buffer_position;
            let num_to_copy = left_in_buffer.min(new_size);
            new_buffer[..num_to_copy].copy_from_slice(
                &self.buffer[self.buffer_position..self.buffer_position + num_to_copy],
            );
            self.buffer_start += self.buffer_position as i64;
            self.buffer_position = 0;
            self.buffer_length = num_to_copy;
            self.buffer = new_buffer;
        }
        Ok(())
    }

    fn position(&self) -> i64 {
        self.buffer_start + self.buffer_position as i64
    }

    fn read_into(&mut self, b: &mut [u8], use_buffer: bool) -> Result<()> {
        let len = b.len();
        let available = self.buffer_length - self.buffer_position;
        if len <= available {
            // the buffer contains enough data to satisfy this request
            b.copy_from_slice(&self.buffer[self.buffer_position..self.buffer_position + len]);
            self.buffer_position += len;
            return Ok(());
        }

        // the buffer does not have enough data, first serve all we've got
        let mut offset = 0;
        if available > 0 {
            b[..available].copy_from_slice(&self.buffer[self.buffer_position..self.buffer_length]);
            offset = available;
            self.buffer_position += available;
        }
        let remaining = len - offset;

        if use_buffer && remaining < self.buffer_size {
            // small remainder, go through the buffer
            self.refill()?;
            if self.buffer_length < remaining {
                let requested = remaining - self.buffer_length;
                self.buffer_position = self.buffer_length;
                return Err(self.eof_error(requested));
            }
            b[offset..].copy_from_slice(&self.buffer[..remaining]);
            self.buffer_position = remaining;
        } else {
            // large remainder, read directly into the caller's slice
            let pos = self.position();
            let after = match pos.checked_add(remaining as i64) {
                Some(after) if after <= self.source.length() as i64 => after,
                _ => return Err(self.eof_error(remaining)),
            };
            self.source.read_internal(pos, &mut b[offset..])?;
            self.buffer_start = after;
            self.buffer_position = 0;
            // trigger refill on read
            self.buffer_length = 0;
        }
        Ok(())
    }

    fn eof_error(&self, requested: usize) -> Error {
        Error::UnexpectedEOF(format!(
            "read past EOF: {} (pos={}, requested={}, length={})",
            self.description,
            self.position(),
            requested,
            self.source.length()
        ))
    }

    fn refill(&mut self) -> Result<()> {
        let start = self.buffer_start + self.buffer_position as i64;
        let length = self.source.length() as i64;
        let end = start.saturating_add(self.buffer_size as i64).min(length);
        if end <= start {
            return Err(self.eof_error(1));
        }
        let new_length = (end - start) as usize;
        if self.buffer.is_empty() {
            self.buffer = vec![0u8; self.buffer_size];
            self.source.seek_internal(self.buffer_start)?;
        }
        self.buffer_start = start;
        self.buffer_position = 0;
        self.buffer_length = 0;
        self.source
            .read_internal(start, &mut self.buffer[..new_length])?;
        self.buffer_length = new_length;
        Ok(())
    }
}

impl<S: BufferedInput> DataInput for BufferedIndexInput<S> {
    fn read_byte(&mut self) -> Result<u8> {
        if self.buffer_position >= self.buffer_length {
            self.refill()?;
        }
        let b = self.buffer[self.buffer_position];
        self.buffer_position += 1;
        Ok(b)
    }

    fn read_bytes(&mut self, b: &mut [u8]) -> Result<()> {
        self.read_into(b, true)
    }
}

impl<S: BufferedInput + 'static> IndexInput for BufferedIndexInput<S> {
    fn clone_input(&self) -> Result<Box<dyn IndexInput>> {
        Ok(Box::new(BufferedIndexInput {
            source: self.source.try_clone()?,
            description: self.description.clone(),
            buffer_size: self.buffer_size,
            buffer: Vec::new(),
            buffer_start: self.position(),
            buffer_length: 0,
            buffer_position: 0,
        }))
    }

    fn file_pointer(&self) -> i64 {
        self.position()
    }

    fn seek(&mut self, pos: i64) -> Result<()> {
        if pos < 0 {
            return Err(Error::IllegalArgument(format!(
                "seeking to negative position {}: {}",
                pos, self.description
            )));
        }
        if pos >= self.buffer_start && pos < self.buffer_start + self.buffer_length as i64 {
            // seek within buffer
            self.buffer_position = (pos - self.buffer_start) as usize;
        } else {
            self.buffer_start = pos;
            self.buffer_position = 0;
            // trigger refill on read
            self.buffer_length = 0;
            self.source.seek_internal(pos)?;
        }
        Ok(())
    }

    fn len(&self) -> u64 {
        self.source.length()
    }

    fn read_bytes_buffered(&mut self, b: &mut [u8], use_buffer: bool) -> Result<()> {
        self.read_into(b, use_buffer)
    }

    fn close(&mut self) -> Result<()> {
        self.source.close()
    }
}

impl<S: BufferedInput> fmt::Display for BufferedIndexInput<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.description)
    }
}
