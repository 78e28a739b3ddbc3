// Copyright (c) 2025 Zensical and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Codec error.

use std::{fmt, result};
use thiserror::Error;

use super::output::Written;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Codec error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Output buffer can't hold the result and its terminator.
    #[error("buffer too small")]
    BufferTooSmall,

    /// Key is absent, or only present as a bare token.
    #[error("key not found")]
    KeyNotFound,

    /// Argument is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(Argument),
}

/// Argument that failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Argument {
    /// Output buffer has zero capacity.
    Buffer,
    /// Lookup key is empty.
    Key,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Error {
    /// Returns the legacy integer code of the error.
    ///
    /// Only an unusable output buffer is reported as `-2`, every other error
    /// is reported as `-1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_codec::{Argument, Error};
    ///
    /// // Obtain legacy codes
    /// assert_eq!(Error::BufferTooSmall.code(), -1);
    /// assert_eq!(Error::InvalidArgument(Argument::Buffer).code(), -2);
    /// ```
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Error::InvalidArgument(Argument::Buffer) => -2,
            Error::BufferTooSmall
            | Error::KeyNotFound
            | Error::InvalidArgument(Argument::Key) => -1,
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Display for Argument {
    /// Formats the argument for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Buffer => f.write_str("buffer has zero capacity"),
            Argument::Key => f.write_str("key is empty"),
        }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the legacy integer status of a result.
///
/// On success, this is the number of bytes written without the terminator,
/// and on failure, the negative code returned by [`Error::code`].
///
/// # Examples
///
/// ```
/// use ember_codec::{encode, status_code};
///
/// // Encode into a buffer that is too small
/// let mut buf = [0u8; 4];
/// assert_eq!(status_code(&encode(b"%%%", &mut buf)), -1);
///
/// // Encode into a buffer that is large enough
/// let mut buf = [0u8; 20];
/// assert_eq!(status_code(&encode(b"abc", &mut buf)), 3);
/// ```
#[must_use]
pub fn status_code(result: &Result<Written<'_>>) -> i64 {
    match result {
        Ok(written) => i64::try_from(written.len()).unwrap_or(i64::MAX),
        Err(err) => err.code(),
    }
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Codec result.
pub type Result<T = ()> = result::Result<T, Error>;
