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

use crate::core::store::io::DataOutput;

/// Abstract base for output to a file in a `Directory`.
///
/// A sequential output stream; files are written once, start to end, and
/// treated as immutable afterwards. `flush` pushes written bytes to the
/// backend; durability comes from `Directory::sync`.
pub trait IndexOutput: DataOutput + fmt::Display + Send {
    /// The name of the file this output writes.
    fn name(&self) -> &str;

    /// Returns the current position in this file, where the next write will
    /// occur.
    fn file_pointer(&self) -> i64;
}
