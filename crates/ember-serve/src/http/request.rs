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

//! HTTP request.

use std::borrow::Cow;
use std::fmt;
use std::path::{Component, Path};
use std::str::{self, FromStr};

use ember_codec::{find_cookie, Cookies};

use super::component::{Header, Method, Status};
use super::headers::Headers;

mod error;
mod uri;

pub use error::{Error, Result};
pub use uri::{Query, Uri};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Maximum size of a request, including the body.
pub const MAX_REQUEST_SIZE: usize = 8 * 1024 * 1024;

/// Maximum length of the request target.
const MAX_URI_LENGTH: usize = 2 * 1024;

/// Maximum length of a single header value.
const MAX_HEADER_LENGTH: usize = 4 * 1024;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request.
///
/// Requests are parsed with [`Request::from_bytes`] and borrow from the read
/// buffer of the connection, so path, query and headers are only allocated
/// when they contain escapes. Headers the server doesn't know are dropped.
///
/// # Examples
///
/// ```
/// use ember_serve::http::{Header, Method, Request};
///
/// // Create request
/// let req = Request::default()
///     .method(Method::Get)
///     .uri("/account")
///     .header(Header::Cookie, "session=abc; theme=dark");
///
/// // Obtain cookie value
/// assert_eq!(req.cookie("theme"), Some("dark"));
/// ```
#[derive(Clone, Debug)]
pub struct Request<'a> {
    /// Request method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri<'a>,
    /// Request headers.
    pub headers: Headers<'a>,
    /// Request body.
    pub body: Cow<'a, [u8]>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Request<'a> {
    /// Creates a request from the given bytes.
    ///
    /// The request line and headers are parsed with [`httparse`], after which
    /// the body is expected to follow as announced by `Content-Length`. Until
    /// all of it has arrived, the request is reported as incomplete, so the
    /// caller can keep reading and retry with more bytes.
    ///
    /// NUL characters are already rejected by [`httparse`], but limits and
    /// path traversal are checked here.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Incomplete`] if more bytes are needed,
    /// [`Error::Parser`] for malformed requests, [`Error::Component`] for an
    /// unsupported method, and [`Error::Validation`] if the request breaks
    /// one of the limits or tries to escape the document root.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use ember_serve::http::{Method, Request};
    ///
    /// // Create request from bytes
    /// let req = Request::from_bytes(b"GET /a%20b?q=1 HTTP/1.1\r\n\r\n")?;
    /// assert_eq!(req.method, Method::Get);
    /// assert_eq!(req.uri.path, "/a b");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        Self::parse(bytes).map(|(req, _)| req)
    }

    /// Creates a request from the start of the given bytes.
    ///
    /// This works like [`Request::from_bytes`], but also returns how many
    /// bytes the request occupies, so pipelined requests following it can be
    /// parsed from the rest of the bytes.
    ///
    /// # Errors
    ///
    /// This method returns the same errors as [`Request::from_bytes`]. More
    /// than [`MAX_REQUEST_SIZE`] bytes without a complete request are too
    /// large, and not incomplete.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use ember_serve::http::Request;
    ///
    /// // Create request from pipelined bytes
    /// let bytes = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
    /// let (req, n) = Request::parse(bytes)?;
    /// assert_eq!(req.uri.path, "/a");
    ///
    /// // Create request from rest
    /// let (req, _) = Request::parse(&bytes[n..])?;
    /// assert_eq!(req.uri.path, "/b");
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse(bytes: &'a [u8]) -> Result<(Self, usize)> {
        let mut headers = [httparse::EMPTY_HEADER; 64];
        let mut req = httparse::Request::new(&mut headers);
        let httparse::Status::Complete(n) = req.parse(bytes)? else {
            return Err(incomplete(bytes.len()));
        };

        // A complete parse always yields method and path
        let method = req.method.ok_or(Error::Incomplete)?.parse()?;
        let path = req.path.ok_or(Error::Incomplete)?;
        if path.len() > MAX_URI_LENGTH {
            return Err(Error::Validation(Status::UriTooLong));
        }

        // Only origin-form targets are supported, as we're not a proxy
        let uri = Uri::from(path);
        if !uri.path.starts_with('/') || is_traversal(&uri.path) {
            return Err(Error::Validation(Status::BadRequest));
        }

        // Collect known headers and skip all others
        let mut map = Headers::new();
        for header in req.headers.iter() {
            if header.value.len() > MAX_HEADER_LENGTH {
                let status = Status::RequestHeaderFieldsTooLarge;
                return Err(Error::Validation(status));
            }
            let name = Header::from_str(header.name);
            if let (Ok(name), Ok(value)) = (name, str::from_utf8(header.value))
            {
                map.insert(name, value);
            }
        }

        // Wait for the body, unless there's none
        let end = match map.get(Header::ContentLength) {
            None => n,
            Some(_) => map
                .content_length()
                .ok_or(Error::Validation(Status::BadRequest))?
                .checked_add(n)
                .filter(|end| *end <= MAX_REQUEST_SIZE)
                .ok_or(Error::Validation(Status::PayloadTooLarge))?,
        };
        let body = bytes.get(n..end).ok_or(Error::Incomplete)?;

        // Return request and its size
        let req = Request {
            method,
            uri,
            headers: map,
            body: Cow::Borrowed(body),
        };
        Ok((req, end))
    }

    /// Returns the value of the cookie with the given name.
    ///
    /// The first cookie with a value wins, and cookies without `=` never
    /// match. Surrounding double quotes are removed from the value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use ember_serve::http::Request;
    ///
    /// // Create request from bytes
    /// let req = Request::from_bytes(
    ///     b"GET / HTTP/1.1\r\nCookie: a=1; b=\"two\"; c\r\n\r\n"
    /// )?;
    ///
    /// // Obtain cookie values
    /// assert_eq!(req.cookie("b"), Some("two"));
    /// assert_eq!(req.cookie("c"), None);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get(Header::Cookie)
            .and_then(|header| find_cookie(header, name))
    }

    /// Returns an iterator over all cookies sent with the request.
    pub fn cookies(&self) -> Cookies<'_> {
        Cookies::new(self.headers.get(Header::Cookie).unwrap_or_default())
    }
}

impl<'a> Request<'a> {
    /// Sets the method of the request.
    #[inline]
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI of the request.
    #[inline]
    #[must_use]
    pub fn uri<U>(mut self, uri: U) -> Self
    where
        U: Into<Uri<'a>>,
    {
        self.uri = uri.into();
        self
    }

    /// Adds a header to the request.
    #[inline]
    #[must_use]
    pub fn header<V>(mut self, header: Header, value: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        self.headers.insert(header, value);
        self
    }

    /// Sets the body of the request.
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = Cow::Owned(body.into());
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Request<'_> {
    /// Creates a `GET` request for `/`.
    #[inline]
    fn default() -> Self {
        Self {
            method: Method::Get,
            uri: Uri::default(),
            headers: Headers::default(),
            body: Cow::Borrowed(&[]),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Request<'_> {
    /// Formats the request for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} HTTP/1.1\r\n", self.method, self.uri)?;
        write!(f, "{}\r\n", self.headers)?;
        write!(f, "[Body: {} bytes]\r\n", self.body.len())
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the error for a request that isn't complete after `len` bytes.
fn incomplete(len: usize) -> Error {
    if len > MAX_REQUEST_SIZE {
        Error::Validation(Status::PayloadTooLarge)
    } else {
        Error::Incomplete
    }
}

/// Returns whether the decoded path contains a `..` component.
fn is_traversal(path: &str) -> bool {
    path.contains("..")
        && Path::new(path)
            .components()
            .any(|component| component == Component::ParentDir)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let bytes = b"GET /docs/a%20b.html?q=x+y&page=2 HTTP/1.1\r\n\
            Host: localhost\r\n\
            X-Unknown: skipped\r\n\
            \r\n";
        let req = Request::from_bytes(bytes).unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.uri.path, "/docs/a b.html");
        assert_eq!(req.uri.query.get("q"), Some("x y"));
        assert_eq!(req.uri.query.get("page"), Some("2"));
        assert_eq!(req.headers.get(Header::Host), Some("localhost"));
        assert_eq!(req.headers.len(), 1);
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_from_bytes_errors() {
        let long = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(2048));
        let value = "v".repeat(4097);
        let header = format!("GET / HTTP/1.1\r\nUser-Agent: {value}\r\n\r\n");
        let test_cases: Vec<(&[u8], Status)> = vec![
            (b"GET http://host/ HTTP/1.1\r\n\r\n", Status::BadRequest),
            (b"GET /a/../../etc HTTP/1.1\r\n\r\n", Status::BadRequest),
            (b"GET /%2e%2e/etc HTTP/1.1\r\n\r\n", Status::BadRequest),
            (b"BREW / HTTP/1.1\r\n\r\n", Status::NotImplemented),
            (b"GET / HTTP/1.1\r\nContent-Length: x\r\n\r\n", Status::BadRequest),
            (
                b"POST / HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n",
                Status::PayloadTooLarge,
            ),
            (
                b"POST / HTTP/1.1\r\nContent-Length: 8388608\r\n\r\n",
                Status::PayloadTooLarge,
            ),
            (long.as_bytes(), Status::UriTooLong),
            (header.as_bytes(), Status::RequestHeaderFieldsTooLarge),
        ];

        for (bytes, expected) in test_cases {
            let err = Request::from_bytes(bytes).unwrap_err();
            assert_eq!(
                err.status(),
                expected,
                "Failed for {:?}",
                String::from_utf8_lossy(&bytes[..bytes.len().min(40)])
            );
        }
    }

    #[test]
    fn test_from_bytes_waits_for_body() {
        let head = b"POST /form HTTP/1.1\r\nContent-Length: 5\r\n\r\n";
        assert!(matches!(
            Request::from_bytes(b"GET / HTTP/1.1\r\n"),
            Err(Error::Incomplete)
        ));
        assert!(matches!(Request::from_bytes(head), Err(Error::Incomplete)));

        let mut bytes = head.to_vec();
        bytes.extend_from_slice(b"a=1&b");
        let req = Request::from_bytes(&bytes).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body.as_ref(), b"a=1&b");
    }

    #[test]
    fn test_parse_pipelined() {
        let bytes = b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc\
            GET /b HTTP/1.1\r\n\r\n\
            GET /c HTTP/1.1\r\n";
        let (req, n) = Request::parse(bytes).unwrap();
        assert_eq!(req.uri.path, "/a");
        assert_eq!(req.body.as_ref(), b"abc");

        let (req, m) = Request::parse(&bytes[n..]).unwrap();
        assert_eq!(req.uri.path, "/b");
        assert_eq!(m, 19);
        assert!(matches!(
            Request::parse(&bytes[n + m..]),
            Err(Error::Incomplete)
        ));
    }

    #[test]
    fn test_parse_too_large() {
        let mut bytes = b"GET / HTTP/1.1\r\nHost: ".to_vec();
        bytes.resize(MAX_REQUEST_SIZE + 1, b'a');
        let err = Request::parse(&bytes).unwrap_err();
        assert_eq!(err.status(), Status::PayloadTooLarge);
    }

    #[test]
    fn test_cookies() {
        let req = Request::default()
            .header(Header::Cookie, "a=1; b=2; c; d; a=3");
        assert_eq!(req.cookie("a"), Some("1"));
        assert_eq!(req.cookie("b"), Some("2"));
        assert_eq!(req.cookie("c"), None);
        assert_eq!(req.cookie("e"), None);
        assert_eq!(req.cookies().count(), 5);
        assert_eq!(Request::default().cookies().count(), 0);
    }
}
