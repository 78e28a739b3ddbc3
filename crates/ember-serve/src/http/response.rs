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

//! HTTP response.

use std::fmt;

use super::component::{Header, Status};
use super::headers::Headers;

mod error;
mod ext;

pub use error::{Error, Result};
pub use ext::ResponseExt;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP response.
///
/// Responses own all of their data, so they can outlive the request they
/// answer. For the common cases, the constructors of [`ResponseExt`] take
/// care of setting `Content-Type` and `Content-Length`.
///
/// # Examples
///
/// ```
/// use ember_serve::http::{Header, Response, Status};
///
/// // Create response
/// let res = Response::default()
///     .status(Status::Ok)
///     .header(Header::ContentLength, 2)
///     .body("ok");
///
/// // Convert response into bytes
/// let bytes = res.into_bytes();
/// assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    /// Response status.
    pub status: Status,
    /// Response headers.
    pub headers: Headers<'static>,
    /// Response body.
    pub body: Vec<u8>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Response {
    /// Converts the response into its wire format.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        let head = format!("HTTP/1.1 {}\r\n{}\r\n", self.status, self.headers);

        // Append body after the head
        let mut buffer = Vec::with_capacity(head.len() + self.body.len());
        buffer.extend_from_slice(head.as_bytes());
        buffer.extend_from_slice(&self.body);
        buffer
    }

    /// Sets the status of the response.
    #[inline]
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Adds a header to the response, replacing any previous value.
    #[allow(clippy::needless_pass_by_value)]
    #[inline]
    #[must_use]
    pub fn header<V>(mut self, header: Header, value: V) -> Self
    where
        V: ToString,
    {
        self.headers.insert(header, value.to_string());
        self
    }

    /// Sets the body of the response.
    ///
    /// This doesn't update `Content-Length`, which is left to the caller.
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = body.into();
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Response {
    /// Creates an empty `200 OK` response.
    #[inline]
    fn default() -> Self {
        Self {
            status: Status::Ok,
            headers: Headers::default(),
            body: Vec::default(),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Response {
    /// Formats the response for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HTTP/1.1 {}\r\n", self.status)?;
        write!(f, "{}\r\n", self.headers)?;
        write!(f, "[Body: {} bytes]\r\n", self.body.len())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_bytes() {
        let res = Response::default()
            .status(Status::NotFound)
            .header(Header::ContentType, "text/plain")
            .header(Header::ContentLength, 9)
            .body("Not Found");
        assert_eq!(
            res.into_bytes(),
            b"HTTP/1.1 404 Not Found\r\n\
              Content-Length: 9\r\n\
              Content-Type: text/plain\r\n\
              \r\n\
              Not Found"
        );
    }

    #[test]
    fn test_into_bytes_without_body() {
        let res = Response::default().status(Status::NotModified);
        assert_eq!(res.into_bytes(), b"HTTP/1.1 304 Not Modified\r\n\r\n");
    }
}
