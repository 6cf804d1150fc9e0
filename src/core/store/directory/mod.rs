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

mod base_directory;

pub use self::base_directory::{BaseDirectory, DirectoryService};

mod slicer;

pub use self::slicer::{IndexInputSlicer, SimpleIndexInputSlicer};

use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use crate::core::store::io::{DataOutput, IndexInput, IndexOutput};
use crate::core::store::lock::{Lock, LockFactory};
use crate::core::store::IOContext;
use crate::Result;

const COPY_BUFFER_SIZE: usize = 16384;

/// A `Directory` is a flat list of files. Files may be written once, when
/// they are created. Once a file is created it may only be opened for read,
/// or deleted. Random access is permitted both when reading and writing.
///
/// Locking is implemented by an instance of `LockFactory`, whose lock names
/// are scoped by this directory's `lock_id`.
///
/// Every operation on a closed directory panics: a closed directory is a
/// terminal state and using it is a caller bug.
pub trait Directory: fmt::Display + Send + Sync {
    type IndexOutput: IndexOutput;

    /// Returns an array of strings, one for each entry in the directory.
    fn list_all(&self) -> Result<Vec<String>>;

    /// Returns true iff a file with the given name exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Removes an existing file in the directory.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Returns the length of a file in the directory. Fails if the file does
    /// not exist, otherwise returns a value >= 0.
    fn file_length(&self, name: &str) -> Result<i64>;

    /// Creates a new, empty file in the directory with the given name.
    /// Returns a stream writing this file.
    fn create_output(&self, name: &str, context: &IOContext) -> Result<Self::IndexOutput>;

    /// Ensure that any writes to these files are moved to stable storage.
    /// Lucene uses this to properly commit changes to the index, to prevent
    /// a machine/OS crash from corrupting the index.
    ///
    /// NOTE: Clients may call this method for same files over and over
    /// again, so some impls might optimize for that. For other impls the
    /// operation can be a noop, for various reasons.
    fn sync(&self, names: &HashSet<String>) -> Result<()>;

    /// Returns a stream reading an existing file.
    fn open_input(&self, name: &str, context: &IOContext) -> Result<Box<dyn IndexInput>>;

    /// Construct a `Lock`.
    fn make_lock(&self, name: &str) -> Box<dyn Lock>;

    /// Attempt to clear (forcefully unlock and remove) the specified lock.
    /// Only call this at a time when you are certain this lock is no longer
    /// in use.
    fn clear_lock(&self, name: &str) -> Result<()>;

    /// Set the `LockFactory` that this directory instance should use for its
    /// locking implementation, scoping it to this directory's `lock_id`.
    fn set_lock_factory(&mut self, lock_factory: Box<dyn LockFactory>);

    fn lock_factory(&self) -> &dyn LockFactory;

    /// Return a string identifier that uniquely differentiates this
    /// directory instance from other directory instances. This ID should be
    /// the same if two directory instances (even in different processes
    /// and/or on different machines) are considered "the same index". This
    /// is how locking "scopes" to the right index.
    fn lock_id(&self) -> String;

    /// Makes the named lock and polls it until obtained or
    /// `lock_wait_timeout` milliseconds have passed.
    fn obtain_lock(&self, name: &str, lock_wait_timeout: i64) -> Result<Box<dyn Lock>>;

    /// Creates an `IndexInputSlicer` for the given file name. The slicer
    /// allows other components to efficiently open `IndexInput` instances
    /// over regions of one file.
    fn create_slicer(&self, name: &str, context: &IOContext)
        -> Result<Box<dyn IndexInputSlicer>>;

    /// Panics if this directory is closed.
    fn ensure_open(&self);

    /// Closes the directory. Closing twice is a no-op.
    fn close(&self) -> Result<()>;
}

/// Copies the file `src` of `from` to a new file `dest` in `to`. The input
/// is closed whether or not the copy succeeds.
pub fn copy_file<F, T>(from: &F, to: &T, src: &str, dest: &str, context: &IOContext) -> Result<()>
where
    F: Directory + ?Sized,
    T: Directory + ?Sized,
{
    let mut input = from.open_input(src, context)?;
    let copied = copy_bytes(input.as_mut(), to, dest, context);
    let closed = input.close();
    match (copied, closed) {
        (Ok(()), closed) => {
            debug!("copied {} from {} to {} in {}", src, from, dest, to);
            closed
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("close {} after failed copy: {}", input, close_err);
            Err(e)
        }
    }
}

fn copy_bytes<T>(input: &mut dyn IndexInput, to: &T, dest: &str, context: &IOContext) -> Result<()>
where
    T: Directory + ?Sized,
{
    let mut output = to.create_output(dest, context)?;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut remaining = input.len() as usize;
    while remaining > 0 {
        let chunk = remaining.min(COPY_BUFFER_SIZE);
        input.read_bytes_buffered(&mut buffer[..chunk], false)?;
        output.write_bytes(&buffer[..chunk])?;
        remaining -= chunk;
    }
    output.flush()?;
    Ok(())
}
