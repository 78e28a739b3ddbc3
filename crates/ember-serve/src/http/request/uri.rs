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

//! HTTP request URI.

use std::borrow::Cow;
use std::fmt;

mod encoding;
mod query;

use encoding::{decode, encode_path};
pub use query::Query;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request URI.
///
/// Only origin-form URIs are supported, i.e., a path that starts with `/`,
/// optionally followed by a query string. The path is percent-decoded when
/// parsing, but `+` is kept verbatim, as it only means a space inside query
/// strings. Fragments are never sent by clients, so they aren't handled.
///
/// # Examples
///
/// ```
/// use ember_serve::http::Uri;
///
/// // Create request URI from string
/// let uri = Uri::from("/a%20b?q=x+y");
/// assert_eq!(uri.path, "/a b");
/// assert_eq!(uri.query.get("q"), Some("x y"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uri<'a> {
    /// Request path.
    pub path: Cow<'a, str>,
    /// Query string.
    pub query: Query<'a>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Uri<'a> {
    /// Creates a request URI from a path and query string.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_serve::http::Uri;
    ///
    /// // Create request URI from parts
    /// let uri = Uri::from_parts("/path", "key=value");
    /// assert_eq!(uri.to_string(), "/path?key=value");
    /// ```
    #[inline]
    #[must_use]
    pub fn from_parts<P, Q>(path: P, query: Q) -> Self
    where
        P: Into<Cow<'a, str>>,
        Q: Into<Query<'a>>,
    {
        Uri {
            path: path.into(),
            query: query.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<'a> From<&'a str> for Uri<'a> {
    /// Creates a request URI from a string.
    fn from(value: &'a str) -> Self {
        let (path, query) = value.split_once('?').unwrap_or((value, ""));
        Uri {
            path: decode(path, false),
            query: Query::from(query),
        }
    }
}

impl Default for Uri<'_> {
    /// Creates a request URI for `/`.
    #[inline]
    fn default() -> Self {
        Uri::from_parts("/", Query::default())
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Uri<'_> {
    /// Formats the request URI for display, percent-encoding it again.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_path(&self.path))?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }

        // No errors occurred
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_from_str() {
        let test_cases = vec![
            ("/", "/", 0),
            ("/docs/", "/docs/", 0),
            ("/a%20b", "/a b", 0),
            ("/a+b", "/a+b", 0),
            ("/search?q=rust&page=2", "/search", 2),
            ("/?", "/", 0),
        ];

        for (value, path, params) in test_cases {
            let uri = Uri::from(value);
            assert_eq!(uri.path, path, "Failed for path of '{value}'");
            assert_eq!(uri.query.len(), params, "Failed for query of '{value}'");
        }
    }

    #[test]
    fn test_uri_display() {
        let uri = Uri::from("/a%20b/c.html?q=x+y");
        assert_eq!(uri.to_string(), "/a%20b/c.html?q=x%20y");
        assert_eq!(Uri::default().to_string(), "/");
    }
}
