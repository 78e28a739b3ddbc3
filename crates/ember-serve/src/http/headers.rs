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

//! HTTP headers.

use std::borrow::Cow;
use std::collections::btree_map::{BTreeMap, Iter};
use std::fmt;

use super::component::Header;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP header map.
///
/// Requests borrow their header values from the buffer they were parsed from,
/// while responses own them, so values are stored as [`Cow`]. Since headers
/// are small integer keys, the map is ordered, which also makes the wire
/// format of responses deterministic.
///
/// # Examples
///
/// ```
/// use ember_serve::http::{Header, Headers};
///
/// // Create header map and add header
/// let mut headers = Headers::new();
/// headers.insert(Header::ContentLength, "13");
/// assert_eq!(headers.get(Header::ContentLength), Some("13"));
/// assert_eq!(headers.to_string(), "Content-Length: 13\r\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Headers<'a> {
    /// Ordered map of headers.
    inner: BTreeMap<Header, Cow<'a, str>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Headers<'a> {
    /// Creates a header map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { inner: BTreeMap::new() }
    }

    /// Returns the value for the given header.
    #[inline]
    #[must_use]
    pub fn get(&self, header: Header) -> Option<&str> {
        self.inner.get(&header).map(AsRef::as_ref)
    }

    /// Returns whether the header is contained.
    #[inline]
    #[must_use]
    pub fn contains(&self, header: Header) -> bool {
        self.inner.contains_key(&header)
    }

    /// Returns the value of the `Content-Length` header, if it is a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_serve::http::{Header, Headers};
    ///
    /// // Create header map and obtain content length
    /// let headers = Headers::from_iter([(Header::ContentLength, " 42")]);
    /// assert_eq!(headers.content_length(), Some(42));
    /// ```
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        self.get(Header::ContentLength)
            .and_then(|value| value.trim_ascii().parse().ok())
    }

    /// Returns whether the `Connection` header asks to close the connection.
    #[must_use]
    pub fn wants_close(&self) -> bool {
        self.get(Header::Connection).is_some_and(|value| {
            value.split(',').any(|token| {
                token.trim_ascii().eq_ignore_ascii_case("close")
            })
        })
    }

    /// Updates the given header, replacing any previous value.
    #[inline]
    pub fn insert<V>(&mut self, header: Header, value: V)
    where
        V: Into<Cow<'a, str>>,
    {
        self.inner.insert(header, value.into());
    }

    /// Removes the given header.
    #[inline]
    pub fn remove(&mut self, header: Header) {
        self.inner.remove(&header);
    }

    /// Returns an iterator over all headers in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, Header, Cow<'a, str>> {
        self.inner.iter()
    }
}

#[allow(clippy::must_use_candidate)]
impl Headers<'_> {
    /// Returns the number of headers.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any headers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<'a, V> FromIterator<(Header, V)> for Headers<'a>
where
    V: Into<Cow<'a, str>>,
{
    /// Creates a header map from an iterator.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (Header, V)>,
    {
        let mut headers = Headers::new();
        for (header, value) in iter {
            headers.insert(header, value);
        }
        headers
    }
}

impl<'h, 'a> IntoIterator for &'h Headers<'a> {
    type Item = (&'h Header, &'h Cow<'a, str>);
    type IntoIter = Iter<'h, Header, Cow<'a, str>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Headers<'_> {
    /// Formats the header map in wire format.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (header, value) in self {
            write!(f, "{header}: {value}\r\n")?;
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
    fn test_content_length() {
        let test_cases = vec![
            ("0", Some(0)),
            ("1024", Some(1024)),
            (" 7 ", Some(7)),
            ("-1", None),
            ("abc", None),
        ];

        for (value, expected) in test_cases {
            let headers = Headers::from_iter([(Header::ContentLength, value)]);
            assert_eq!(
                headers.content_length(),
                expected,
                "Failed for Content-Length: {value}"
            );
        }
        assert_eq!(Headers::new().content_length(), None);
    }

    #[test]
    fn test_wants_close() {
        let test_cases = vec![
            ("close", true),
            ("Close", true),
            ("keep-alive", false),
            ("upgrade, close", true),
        ];

        for (value, expected) in test_cases {
            let headers = Headers::from_iter([(Header::Connection, value)]);
            assert_eq!(
                headers.wants_close(),
                expected,
                "Failed for Connection: {value}"
            );
        }
    }

    #[test]
    fn test_display_is_ordered() {
        let mut headers = Headers::new();
        headers.insert(Header::Server, "ember");
        headers.insert(Header::ContentType, "text/plain");
        headers.insert(Header::Server, String::from("ember/0.0.1"));
        assert_eq!(
            headers.to_string(),
            "Content-Type: text/plain\r\nServer: ember/0.0.1\r\n"
        );
    }
}
