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

//! Allocation-free percent-encoding and cookie extraction.
//!
//! All functions in this crate write into a caller-supplied buffer and never
//! allocate, which makes them usable in the hot path of request handling. The
//! output is always NUL-terminated, so one byte of every buffer is reserved
//! for the terminator, and writing never exceeds the length of the buffer.
//!
//! Results are returned as a [`Result`] carrying a [`Written`] view into the
//! buffer on success. For interoperability with callers expecting the classic
//! integer contract, [`status_code`] maps a result to its length or negative
//! sentinel.
//!
//! # Examples
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use ember_codec::{decode, encode, get_cookie};
//!
//! // Encode and decode a value
//! let mut buf = [0u8; 32];
//! let encoded = encode(b"a%b/c&d.e", &mut buf)?;
//! assert_eq!(encoded, "a%25b%2fc%26d.e");
//!
//! let mut buf = [0u8; 32];
//! let decoded = decode(b"x+y%21", &mut buf, true)?;
//! assert_eq!(decoded, "x y!");
//!
//! // Extract a cookie value
//! let mut buf = [0u8; 32];
//! let value = get_cookie("a=1; b=123", "b", &mut buf)?;
//! assert_eq!(value, "123");
//! # Ok(())
//! # }
//! ```

mod cookie;
mod error;
mod output;
mod percent;

pub use cookie::{find_cookie, get_cookie, Cookies, Pair};
pub use error::{status_code, Argument, Error, Result};
pub use output::Written;
pub use percent::{decode, decoded_len, encode, encoded_len};

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_concurrent_calls() {
        thread::scope(|scope| {
            for n in 0..8 {
                scope.spawn(move || {
                    let value = format!("v{n}&x");
                    let header = format!("a=0; k{n}={value}; z=9");
                    for _ in 0..1000 {
                        let mut enc = [0u8; 16];
                        let mut dec = [0u8; 16];
                        let mut out = [0u8; 16];
                        let encoded = encode(value.as_bytes(), &mut enc).unwrap();
                        assert_eq!(encoded, format!("v{n}%26x").as_str());
                        let decoded = decode(&encoded, &mut dec, false).unwrap();
                        assert_eq!(decoded, value.as_str());
                        let key = format!("k{n}");
                        let cookie = get_cookie(&header, &key, &mut out).unwrap();
                        assert_eq!(cookie, value.as_str(), "Failed for {key}");
                    }
                });
            }
        });
    }
}
