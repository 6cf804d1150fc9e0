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

//! In-memory readers, a RAM directory service and an in-process lock
//! factory for unit tests.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::core::store::directory::DirectoryService;
use crate::core::store::io::{BufferedIndexInput, BufferedInput, DataOutput, IndexInput, IndexOutput};
use crate::core::store::lock::{prefixed_lock_name, Lock, LockFactory};
use crate::core::store::IOContext;
use crate::error::Error;
use crate::Result;

impl DataOutput for Vec<u8> {}

pub(crate) fn sequence(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

pub(crate) struct ByteArraySource {
    data: Arc<Vec<u8>>,
    reads: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl ByteArraySource {
    pub(crate) fn new(data: Arc<Vec<u8>>) -> Self {
        ByteArraySource {
            data,
            reads: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl BufferedInput for ByteArraySource {
    fn read_internal(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let start = pos as usize;
        let end = start + buf.len();
        if pos < 0 || end > self.data.len() {
            return Err(Error::UnexpectedEOF(format!(
                "read past EOF: {}..{} of {}",
                start,
                end,
                self.data.len()
            )));
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

    fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn try_clone(&self) -> Result<Self> {
        Ok(ByteArraySource {
            data: Arc::clone(&self.data),
            reads: Arc::clone(&self.reads),
            closed: Arc::clone(&self.closed),
        })
    }
}

pub(crate) fn byte_input(data: Vec<u8>, buffer_size: usize) -> BufferedIndexInput<ByteArraySource> {
    counted_byte_input(data, buffer_size).0
}

/// A byte input plus its physical read counter and closed flag.
pub(crate) fn counted_byte_input(
    data: Vec<u8>,
    buffer_size: usize,
) -> (
    BufferedIndexInput<ByteArraySource>,
    Arc<AtomicUsize>,
    Arc<AtomicBool>,
) {
    let source = ByteArraySource::new(Arc::new(data));
    let reads = Arc::clone(&source.reads);
    let closed = Arc::clone(&source.closed);
    let input = BufferedIndexInput::with_buffer_size("ByteArrayInput".into(), source, buffer_size)
        .unwrap();
    (input, reads, closed)
}

type FileMap = Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>;

pub(crate) struct RamService {
    id: String,
    files: FileMap,
    synced: Mutex<HashSet<String>>,
    closed: AtomicBool,
    read_only: AtomicBool,
    input_flags: Mutex<Vec<Arc<AtomicBool>>>,
}

impl RamService {
    pub(crate) fn new(id: &str) -> Self {
        RamService {
            id: id.to_string(),
            files: Arc::new(RwLock::new(HashMap::new())),
            synced: Mutex::new(HashSet::new()),
            closed: AtomicBool::new(false),
            read_only: AtomicBool::new(false),
            input_flags: Mutex::new(Vec::new()),
        }
    }

    /// Makes `create_output` fail with a permission error.
    pub(crate) fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of inputs opened through this service and not closed yet.
    pub(crate) fn open_inputs(&self) -> usize {
        self.input_flags
            .lock()
            .unwrap()
            .iter()
            .filter(|closed| !closed.load(Ordering::SeqCst))
            .count()
    }

    pub(crate) fn synced(&self) -> HashSet<String> {
        self.synced.lock().unwrap().clone()
    }

    pub(crate) fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl DirectoryService for RamService {
    type IndexOutput = RamOutput;

    fn list_all(&self) -> Result<Vec<String>> {
        Ok(self.files.read().unwrap().keys().cloned().collect())
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.read().unwrap().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        match self.files.write().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(Error::NoSuchFile(name.to_string())),
        }
    }

    fn file_length(&self, name: &str) -> Result<i64> {
        match self.files.read().unwrap().get(name) {
            Some(data) => Ok(data.len() as i64),
            None => Err(Error::NoSuchFile(name.to_string())),
        }
    }

    fn create_output(&self, name: &str, _context: &IOContext) -> Result<RamOutput> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, name.to_string()).into());
        }
        self.files
            .write()
            .unwrap()
            .insert(name.to_string(), Arc::new(Vec::new()));
        Ok(RamOutput {
            name: name.to_string(),
            files: Arc::clone(&self.files),
            buffer: Vec::new(),
        })
    }

    fn sync(&self, names: &HashSet<String>) -> Result<()> {
        let files = self.files.read().unwrap();
        let mut synced = self.synced.lock().unwrap();
        for name in names {
            if !files.contains_key(name) {
                return Err(Error::NoSuchFile(name.clone()));
            }
            synced.insert(name.clone());
        }
        Ok(())
    }

    fn open_input(&self, name: &str, context: &IOContext) -> Result<Box<dyn IndexInput>> {
        let data = match self.files.read().unwrap().get(name) {
            Some(data) => Arc::clone(data),
            None => return Err(Error::NoSuchFile(name.to_string())),
        };
        let source = ByteArraySource::new(data);
        self.input_flags
            .lock()
            .unwrap()
            .push(Arc::clone(&source.closed));
        Ok(Box::new(BufferedIndexInput::with_context(
            format!("RamInput({})", name),
            source,
            context,
        )))
    }

    fn lock_id(&self) -> String {
        self.id.clone()
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct RamOutput {
    name: String,
    files: FileMap,
    buffer: Vec<u8>,
}

impl Write for RamOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.files
            .write()
            .unwrap()
            .insert(self.name.clone(), Arc::new(self.buffer.clone()));
        Ok(())
    }
}

impl DataOutput for RamOutput {}

impl IndexOutput for RamOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn file_pointer(&self) -> i64 {
        self.buffer.len() as i64
    }
}

impl fmt::Display for RamOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RamOutput({})", self.name)
    }
}

/// Locks shared by every clone of the factory.
#[derive(Clone, Default)]
pub(crate) struct RamLockFactory {
    held: Arc<Mutex<HashSet<String>>>,
    lock_prefix: Option<String>,
}

impl RamLockFactory {
    pub(crate) fn new() -> Self {
        Default::default()
    }
}

impl LockFactory for RamLockFactory {
    fn make_lock(&self, lock_name: &str) -> Box<dyn Lock> {
        Box::new(RamLock {
            name: prefixed_lock_name(self.lock_prefix(), lock_name),
            held: Arc::clone(&self.held),
            holding: false,
        })
    }

    fn clear_lock(&self, lock_name: &str) -> Result<()> {
        let name = prefixed_lock_name(self.lock_prefix(), lock_name);
        self.held.lock().unwrap().remove(&name);
        Ok(())
    }

    fn set_lock_prefix(&mut self, lock_prefix: Option<String>) {
        self.lock_prefix = lock_prefix;
    }

    fn lock_prefix(&self) -> Option<&str> {
        self.lock_prefix.as_deref()
    }
}

impl fmt::Display for RamLockFactory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RamLockFactory({:?})", self.lock_prefix)
    }
}

struct RamLock {
    name: String,
    held: Arc<Mutex<HashSet<String>>>,
    holding: bool,
}

impl Lock for RamLock {
    fn obtain(&mut self) -> Result<bool> {
        let obtained = self.held.lock().unwrap().insert(self.name.clone());
        self.holding |= obtained;
        Ok(obtained)
    }

    fn release(&mut self) -> Result<()> {
        if self.holding {
            self.held.lock().unwrap().remove(&self.name);
            self.holding = false;
        }
        Ok(())
    }

    fn is_locked(&self) -> bool {
        self.held.lock().unwrap().contains(&self.name)
    }
}

impl fmt::Display for RamLock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RamLock@{}", self.name)
    }
}
