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

use crate::core::store::io::{IndexInput, SlicedIndexInput, BUFFER_SIZE};
use crate::error::{Error, Result};

/// Allows to create one or more sliced `IndexInput` instances from a
/// single file handle.
pub trait IndexInputSlicer: Send + Sync {
    /// Returns an `IndexInput` slice starting at the given offset with the
    /// given length.
    fn open_slice(&self, description: &str, offset: i64, length: i64)
        -> Result<Box<dyn IndexInput>>;

    /// Returns an `IndexInput` over the whole file, positioned at 0.
    fn open_full_slice(&self) -> Result<Box<dyn IndexInput>>;

    /// Releases the file handle behind this slicer.
    fn close(&mut self) -> Result<()>;
}

/// Slices a fully opened input. Every slice reads through its own clone of
/// that input, so slices can be used independently of each other and of
/// the slicer.
pub struct SimpleIndexInputSlicer {
    base: Box<dyn IndexInput>,
    buffer_size: usize,
    closed: bool,
}

impl SimpleIndexInputSlicer {
    pub fn new(base: Box<dyn IndexInput>) -> Self {
        Self::with_buffer_size(base, BUFFER_SIZE)
    }

    pub fn with_buffer_size(base: Box<dyn IndexInput>, buffer_size: usize) -> Self {
        SimpleIndexInputSlicer {
            base,
            buffer_size,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::IllegalState(format!("slicer over {} is closed", self.base)));
        }
        Ok(())
    }
}

impl IndexInputSlicer for SimpleIndexInputSlicer {
    fn open_slice(
        &self,
        description: &str,
        offset: i64,
        length: i64,
    ) -> Result<Box<dyn IndexInput>> {
        self.ensure_open()?;
        let base = self.base.clone_input()?;
        let slice =
            SlicedIndexInput::with_buffer_size(description, base, offset, length, self.buffer_size)?;
        Ok(Box::new(slice))
    }

    fn open_full_slice(&self) -> Result<Box<dyn IndexInput>> {
        self.ensure_open()?;
        let mut full = self.base.clone_input()?;
        full.seek(0)?;
        Ok(full)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.base.close()
    }
}
