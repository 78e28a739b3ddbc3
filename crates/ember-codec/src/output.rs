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

//! Output buffer.

use std::ops::Deref;
use std::{fmt, str};

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// View of the bytes written into an output buffer.
///
/// This is the success value of all functions of this crate. It borrows the
/// caller's buffer immutably and covers exactly the bytes written, excluding
/// the NUL terminator, which directly follows them in the buffer.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_codec::encode;
///
/// // Encode into buffer
/// let mut buf = [0u8; 20];
/// let written = encode(b"abc", &mut buf)?;
/// assert_eq!(written.len(), 3);
/// assert_eq!(written.as_bytes(), b"abc");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Written<'a> {
    /// Written bytes.
    bytes: &'a [u8],
}

/// Cursor over a caller-supplied output buffer.
///
/// The cursor reserves the last byte of the buffer for the terminator, and
/// only accepts writes that fit as a whole, so escape sequences are never
/// torn apart when the buffer runs out of space.
pub(crate) struct Output<'a> {
    /// Output buffer.
    buf: &'a mut [u8],
    /// Number of bytes written.
    len: usize,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Written<'a> {
    /// Returns the written bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the written bytes as a string, if they are valid UTF-8.
    ///
    /// # Errors
    ///
    /// This method returns [`str::Utf8Error`] if decoding produced bytes that
    /// don't form valid UTF-8, which can happen for arbitrary escapes.
    #[inline]
    pub fn to_str(&self) -> std::result::Result<&'a str, str::Utf8Error> {
        str::from_utf8(self.bytes)
    }
}

#[allow(clippy::must_use_candidate)]
impl Written<'_> {
    /// Returns the number of bytes written, excluding the terminator.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether nothing was written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ----------------------------------------------------------------------------

impl<'a> Output<'a> {
    /// Creates an output cursor.
    ///
    /// A buffer without room for the terminator can't be written at all.
    pub fn new(buf: &'a mut [u8]) -> Result<Self> {
        if buf.is_empty() {
            Err(Error::BufferTooSmall)
        } else {
            Ok(Self { buf, len: 0 })
        }
    }

    /// Appends the given bytes if they fit as a whole.
    #[must_use]
    pub fn push(&mut self, bytes: &[u8]) -> bool {
        let end = self.len + bytes.len();
        if end < self.buf.len() {
            self.buf[self.len..end].copy_from_slice(bytes);
            self.len = end;
            true
        } else {
            false
        }
    }

    /// Terminates the buffer and returns the written bytes.
    pub fn finish(self) -> Written<'a> {
        let Output { buf, len } = self;
        buf[len] = 0;

        // Downgrade to a shared borrow for the returned view
        let buf: &'a [u8] = buf;
        Written { bytes: &buf[..len] }
    }

    /// Terminates the buffer after a failed write and returns the error.
    pub fn overflow(self) -> Error {
        self.buf[self.len] = 0;
        Error::BufferTooSmall
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Deref for Written<'_> {
    type Target = [u8];

    /// Dereferences to the written bytes.
    #[inline]
    fn deref(&self) -> &Self::Target {
        self.bytes
    }
}

impl AsRef<[u8]> for Written<'_> {
    /// Returns the written bytes.
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

// ----------------------------------------------------------------------------

impl PartialEq<[u8]> for Written<'_> {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for Written<'_> {
    #[inline]
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<str> for Written<'_> {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for Written<'_> {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

// ----------------------------------------------------------------------------

impl fmt::Debug for Written<'_> {
    /// Formats the written bytes for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Written")
            .field(&String::from_utf8_lossy(self.bytes))
            .finish()
    }
}
