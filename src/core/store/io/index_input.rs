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

use crate::core::store::io::DataInput;
use crate::Result;

/// Abstract base for input from a file in a `Directory`.
///
/// A random-access input stream, used for all Lucene index input
/// operations. `Display` gives a description of the input for diagnostics
/// only.
///
/// An instance must not be driven from several threads at once; clone it
/// first, every clone owns its own position.
pub trait IndexInput: DataInput + fmt::Display + Send + Sync {
    /// Returns an independent input over the same bytes, positioned where
    /// this input currently is.
    fn clone_input(&self) -> Result<Box<dyn IndexInput>>;

    /// Returns the current position in this file, where the next read will
    /// occur.
    fn file_pointer(&self) -> i64;

    /// Sets current position in this file, where the next read will occur.
    /// Seeking past the end is allowed, the next read then fails.
    fn seek(&mut self, pos: i64) -> Result<()>;

    /// The number of bytes in the file.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `b.len()` bytes, optionally bypassing any internal buffer.
    /// Inputs without a buffer ignore `use_buffer`.
    fn read_bytes_buffered(&mut self, b: &mut [u8], _use_buffer: bool) -> Result<()> {
        self.read_bytes(b)
    }

    /// Closes the stream to further operations.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
