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

mod io_context;

pub use self::io_context::{FlushInfo, IOContext, IOContextType, MergeInfo};

mod config;

pub use self::config::StoreConfig;

pub mod lock;

pub use self::lock::{
    obtain_within_interval, prefixed_lock_name, with_lock, FSLockFactoryBase, Lock, LockFactory,
    LOCK_OBTAIN_WAIT_FOREVER, LOCK_POLL_INTERVAL,
};

pub mod directory;
pub mod io;

#[cfg(test)]
pub(crate) mod test_util;
