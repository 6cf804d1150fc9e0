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

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::store::directory::{Directory, IndexInputSlicer, SimpleIndexInputSlicer};
use crate::core::store::io::{IndexInput, IndexOutput};
use crate::core::store::lock::{obtain_within_interval, Lock, LockFactory};
use crate::core::store::{IOContext, StoreConfig};
use crate::error::Error;
use crate::Result;

/// The storage backend behind a `BaseDirectory`.
///
/// Implementations only do the physical work; `BaseDirectory` checks that
/// the directory is open before calling any of these.
pub trait DirectoryService: Send + Sync {
    type IndexOutput: IndexOutput;

    fn list_all(&self) -> Result<Vec<String>>;

    fn file_exists(&self, name: &str) -> bool;

    fn delete_file(&self, name: &str) -> Result<()>;

    /// Must fail with `Error::NoSuchFile` when the file does not exist.
    fn file_length(&self, name: &str) -> Result<i64>;

    fn create_output(&self, name: &str, context: &IOContext) -> Result<Self::IndexOutput>;

    fn sync(&self, names: &HashSet<String>) -> Result<()>;

    fn open_input(&self, name: &str, context: &IOContext) -> Result<Box<dyn IndexInput>>;

    /// Identical for every service over the same physical index.
    fn lock_id(&self) -> String;

    /// Opens the file and slices it through `SimpleIndexInputSlicer`.
    /// Backends able to share or map the file should override this.
    fn create_slicer(
        &self,
        name: &str,
        context: &IOContext,
        config: &StoreConfig,
    ) -> Result<Box<dyn IndexInputSlicer>> {
        let base = self.open_input(name, context)?;
        Ok(Box::new(SimpleIndexInputSlicer::with_buffer_size(
            base,
            config.buffer_size(context),
        )))
    }

    /// Releases backend resources, called once by `BaseDirectory::close`.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Base implementation for a concrete `Directory`: tracks the open flag and
/// the lock factory, and delegates file access to a `DirectoryService`.
pub struct BaseDirectory<S: DirectoryService> {
    service: S,
    is_open: AtomicBool,
    lock_factory: Box<dyn LockFactory>,
    config: StoreConfig,
}

impl<S: DirectoryService> BaseDirectory<S> {
    pub fn new(service: S, lock_factory: Box<dyn LockFactory>) -> Self {
        Self::with_config(service, lock_factory, StoreConfig::default())
    }

    pub fn with_config(
        service: S,
        mut lock_factory: Box<dyn LockFactory>,
        config: StoreConfig,
    ) -> Self {
        lock_factory.set_lock_prefix(Some(service.lock_id()));
        BaseDirectory {
            service,
            is_open: AtomicBool::new(true),
            lock_factory,
            config,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }
}

impl<S: DirectoryService> Directory for BaseDirectory<S> {
    type IndexOutput = S::IndexOutput;

    fn list_all(&self) -> Result<Vec<String>> {
        self.ensure_open();
        self.service.list_all()
    }

    fn file_exists(&self, name: &str) -> bool {
        self.ensure_open();
        self.service.file_exists(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.ensure_open();
        self.service.delete_file(name)
    }

    fn file_length(&self, name: &str) -> Result<i64> {
        self.ensure_open();
        let length = self.service.file_length(name)?;
        if length < 0 {
            return Err(Error::NoSuchFile(format!("{} in {}", name, self)));
        }
        Ok(length)
    }

    fn create_output(&self, name: &str, context: &IOContext) -> Result<Self::IndexOutput> {
        self.ensure_open();
        self.service.create_output(name, context)
    }

    fn sync(&self, names: &HashSet<String>) -> Result<()> {
        self.ensure_open();
        self.service.sync(names)
    }

    fn open_input(&self, name: &str, context: &IOContext) -> Result<Box<dyn IndexInput>> {
        self.ensure_open();
        self.service.open_input(name, context)
    }

    fn make_lock(&self, name: &str) -> Box<dyn Lock> {
        self.ensure_open();
        self.lock_factory.make_lock(name)
    }

    fn clear_lock(&self, name: &str) -> Result<()> {
        self.ensure_open();
        self.lock_factory.clear_lock(name)
    }

    fn set_lock_factory(&mut self, mut lock_factory: Box<dyn LockFactory>) {
        self.ensure_open();
        lock_factory.set_lock_prefix(Some(self.lock_id()));
        self.lock_factory = lock_factory;
    }

    fn lock_factory(&self) -> &dyn LockFactory {
        self.ensure_open();
        self.lock_factory.as_ref()
    }

    fn lock_id(&self) -> String {
        self.service.lock_id()
    }

    fn obtain_lock(&self, name: &str, lock_wait_timeout: i64) -> Result<Box<dyn Lock>> {
        let mut lock = self.make_lock(name);
        obtain_within_interval(
            lock.as_mut(),
            lock_wait_timeout,
            self.config.lock_poll_interval(),
        )?;
        Ok(lock)
    }

    fn create_slicer(
        &self,
        name: &str,
        context: &IOContext,
    ) -> Result<Box<dyn IndexInputSlicer>> {
        self.ensure_open();
        debug!("create slicer for {} with {}", name, context);
        self.service.create_slicer(name, context, &self.config)
    }

    fn ensure_open(&self) {
        if !self.is_open() {
            error!("This Directory is closed: {}", self);
            panic!("this Directory is closed");
        }
    }

    fn close(&self) -> Result<()> {
        if self.is_open.swap(false, Ordering::AcqRel) {
            debug!("closing {}", self);
            self.service.close()?;
        }
        Ok(())
    }
}

impl<S: DirectoryService> fmt::Display for BaseDirectory<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Directory@{} lockFactory={}",
            self.service.lock_id(),
            self.lock_factory
        )
    }
}
