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

extern crate serde_json;

use thiserror::Error;

pub use super::Result;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Illegal state: {0}")]
    IllegalState(String),
    #[error("IllegalArgument: {0}")]
    IllegalArgument(String),
    #[error("Unexpected EOF: {0}")]
    UnexpectedEOF(String),
    #[error("Corrupt Index: {0}")]
    CorruptIndex(String),
    #[error("No Such File: {0}")]
    NoSuchFile(String),
    #[error(
        "Lock obtain timed out: {lock}{}",
        .reason.as_ref().map(|r| format!(": {}", r)).unwrap_or_default()
    )]
    LockObtainFailed {
        lock: String,
        #[source]
        reason: Option<Box<Error>>,
    },
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("FromUtf8 Error: {0}")]
    FromUtf8Error(#[from] std::string::FromUtf8Error),
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error signals reading past the end of an input.
    pub fn is_eof(&self) -> bool {
        match self {
            Error::UnexpectedEOF(_) => true,
            Error::IOError(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
