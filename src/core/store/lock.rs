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
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::Error;
use crate::Result;

/// How long `obtain_within` waits, in milliseconds, in between attempts to
/// acquire the lock.
pub const LOCK_POLL_INTERVAL: u64 = 1000;

/// Pass this value to `obtain_within` to try forever to obtain the lock.
pub const LOCK_OBTAIN_WAIT_FOREVER: i64 = -1;

/// An interprocess mutex lock.
///
/// Typical use might look like:
///
/// ```ignore
/// let mut lock = directory.make_lock("my.lock");
/// with_lock(lock.as_mut(), 5000, || {
///     // code to execute while locked
///     Ok(())
/// })?;
/// ```
///
/// A lock models one exclusive holder at a time; exclusion itself is
/// enforced by the backend, not by this trait.
pub trait Lock: fmt::Display + Send {
    /// Attempts to obtain exclusive access and immediately returns upon
    /// success or failure.
    ///
    /// An implementation that fails part way must release whatever it
    /// acquired before returning.
    fn obtain(&mut self) -> Result<bool>;

    /// Releases exclusive access. Releasing a lock this handle does not hold
    /// must never free another holder's lock.
    fn release(&mut self) -> Result<()>;

    /// Returns true if the resource is currently locked. Note that one must
    /// still call `obtain` before using the resource.
    fn is_locked(&self) -> bool;

    /// The root cause recorded by the last `obtain` that returned `false`,
    /// if the backend knows one.
    fn take_failure_reason(&mut self) -> Option<Error> {
        None
    }

    /// Attempts to obtain an exclusive lock within the given number of
    /// milliseconds, polling once per `LOCK_POLL_INTERVAL`.
    fn obtain_within(&mut self, lock_wait_timeout: i64) -> Result<()> {
        obtain_within_interval(
            self,
            lock_wait_timeout,
            Duration::from_millis(LOCK_POLL_INTERVAL),
        )
    }
}

/// Sleep durations between two `obtain` attempts.
///
/// A finite timeout is spent as `timeout / interval` full intervals followed
/// by one shorter sleep for the remainder, so the number of attempts only
/// depends on the arguments: `timeout = 2 * interval` gives three attempts,
/// `2 * interval + 1` gives four, and `0` gives one.
struct PollSchedule {
    interval: Duration,
    remaining: Option<Duration>,
}

impl PollSchedule {
    fn new(lock_wait_timeout: i64, interval: Duration) -> Self {
        let remaining = if lock_wait_timeout == LOCK_OBTAIN_WAIT_FOREVER {
            None
        } else {
            Some(Duration::from_millis(lock_wait_timeout as u64))
        };
        PollSchedule {
            interval,
            remaining,
        }
    }
}

impl Iterator for PollSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        match self.remaining {
            None => Some(self.interval),
            Some(remaining) if remaining.as_nanos() == 0 => None,
            Some(remaining) => {
                let sleep = remaining.min(self.interval);
                self.remaining = Some(remaining - sleep);
                Some(sleep)
            }
        }
    }
}

/// Polls `lock.obtain()` every `poll_interval` until it succeeds or
/// `lock_wait_timeout` milliseconds have been spent sleeping.
///
/// Errors from individual attempts do not stop the polling; the most recent
/// one is kept and reported as the reason of the final timeout error.
pub fn obtain_within_interval<L: Lock + ?Sized>(
    lock: &mut L,
    lock_wait_timeout: i64,
    poll_interval: Duration,
) -> Result<()> {
    if lock_wait_timeout < 0 && lock_wait_timeout != LOCK_OBTAIN_WAIT_FOREVER {
        return Err(Error::IllegalArgument(format!(
            "lock_wait_timeout should be LOCK_OBTAIN_WAIT_FOREVER or a non-negative number \
             (got {})",
            lock_wait_timeout
        )));
    }
    if poll_interval.as_nanos() == 0 {
        return Err(Error::IllegalArgument(
            "lock poll interval must be positive".into(),
        ));
    }

    let mut schedule = PollSchedule::new(lock_wait_timeout, poll_interval);
    let mut failure_reason: Option<Error> = None;
    let mut attempts = 0u64;
    loop {
        attempts += 1;
        match lock.obtain() {
            Ok(true) => {
                debug!("obtained {} after {} attempt(s)", lock, attempts);
                return Ok(());
            }
            Ok(false) => {
                if let Some(reason) = lock.take_failure_reason() {
                    warn!("obtain {} failed: {}", lock, reason);
                    failure_reason = Some(reason);
                }
            }
            Err(e) => {
                warn!("obtain {} failed: {}", lock, e);
                failure_reason = Some(e);
            }
        }

        match schedule.next() {
            Some(sleep) => {
                debug!("{} is held, retry in {:?}", lock, sleep);
                thread::sleep(sleep);
            }
            None => {
                return Err(Error::LockObtainFailed {
                    lock: lock.to_string(),
                    reason: failure_reason.map(Box::new),
                });
            }
        }
    }
}

/// Runs `body` with exclusive access, releasing the lock afterwards even
/// when the body fails.
pub fn with_lock<L, T, F>(lock: &mut L, lock_wait_timeout: i64, body: F) -> Result<T>
where
    L: Lock + ?Sized,
    F: FnOnce() -> Result<T>,
{
    lock.obtain_within(lock_wait_timeout)?;
    let res = body();
    let released = lock.release();
    match (res, released) {
        (Ok(value), released) => released.map(|_| value),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_err)) => {
            warn!("release {} after failed body: {}", lock, release_err);
            Err(e)
        }
    }
}

/// Base trait for lock factories.
///
/// A factory scopes the names of the locks it makes with a prefix, which the
/// owning `Directory` sets from its `lock_id` when the factory is installed.
pub trait LockFactory: fmt::Display + Send + Sync {
    /// Return a new lock instance identified by `lock_name`.
    fn make_lock(&self, lock_name: &str) -> Box<dyn Lock>;

    /// Attempt to clear (forcefully unlock and remove) the specified lock.
    /// Only call this at a time when you are certain this lock is no longer
    /// in use.
    fn clear_lock(&self, lock_name: &str) -> Result<()>;

    fn set_lock_prefix(&mut self, lock_prefix: Option<String>);

    fn lock_prefix(&self) -> Option<&str>;
}

/// The name a lock gets on the backing medium once scoped by `lock_prefix`.
pub fn prefixed_lock_name(lock_prefix: Option<&str>, lock_name: &str) -> String {
    match lock_prefix {
        Some(prefix) => format!("{}-{}", prefix, lock_name),
        None => lock_name.to_string(),
    }
}

/// Shared state of lock factories that keep their locks as files in a
/// directory.
#[derive(Debug, Default)]
pub struct FSLockFactoryBase {
    lock_prefix: Option<String>,
    // can not be set twice
    lock_dir: Option<PathBuf>,
}

impl FSLockFactoryBase {
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the lock directory. This can be done only once.
    ///
    /// # Panics
    ///
    /// Panics if the lock directory was already set.
    pub fn set_lock_dir(&mut self, lock_dir: PathBuf) {
        if let Some(ref current) = self.lock_dir {
            error!(
                "lock directory already set to {}, refusing {}",
                current.display(),
                lock_dir.display()
            );
            panic!("You can set the lock directory for this factory only once.");
        }
        self.lock_dir = Some(lock_dir);
    }

    pub fn lock_dir(&self) -> Option<&Path> {
        self.lock_dir.as_deref()
    }

    pub fn set_lock_prefix(&mut self, lock_prefix: Option<String>) {
        self.lock_prefix = lock_prefix;
    }

    pub fn lock_prefix(&self) -> Option<&str> {
        self.lock_prefix.as_deref()
    }

    /// Path of the file backing `lock_name`.
    pub fn lock_path(&self, lock_name: &str) -> Option<PathBuf> {
        let name = prefixed_lock_name(self.lock_prefix(), lock_name);
        self.lock_dir.as_ref().map(|dir| dir.join(name))
    }
}

impl fmt::Display for FSLockFactoryBase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.lock_dir {
            Some(ref dir) => write!(f, "FSLockFactory@{}", dir.display()),
            None => write!(f, "FSLockFactory@<unset>"),
        }
    }
}
