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

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::store::io::{BUFFER_SIZE, MERGE_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::core::store::lock::LOCK_POLL_INTERVAL;
use crate::core::store::IOContext;
use crate::error::Error;
use crate::Result;

/// Tunables shared by a directory and the inputs and locks it hands out.
///
/// Every field is optional in the serialized form and falls back to the
/// store defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub buffer_size: usize,
    pub merge_buffer_size: usize,
    pub lock_poll_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            buffer_size: BUFFER_SIZE,
            merge_buffer_size: MERGE_BUFFER_SIZE,
            lock_poll_interval_ms: LOCK_POLL_INTERVAL,
        }
    }
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<StoreConfig> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::IllegalArgument(format!(
                "buffer_size must be at least {} (got {})",
                MIN_BUFFER_SIZE, self.buffer_size
            )));
        }
        if self.merge_buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::IllegalArgument(format!(
                "merge_buffer_size must be at least {} (got {})",
                MIN_BUFFER_SIZE, self.merge_buffer_size
            )));
        }
        if self.lock_poll_interval_ms == 0 {
            return Err(Error::IllegalArgument(
                "lock_poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Buffer size for inputs opened under `context`.
    pub fn buffer_size(&self, context: &IOContext) -> usize {
        if context.is_merge() {
            self.merge_buffer_size
        } else {
            self.buffer_size
        }
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }
}
