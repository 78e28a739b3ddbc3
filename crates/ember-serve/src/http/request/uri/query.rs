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

//! HTTP query string.

use std::borrow::Cow;
use std::fmt;

use super::encoding::{decode, encode};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP query string.
///
/// Parameters are kept in order of appearance, as keys may repeat. Keys and
/// values are decoded in form mode when parsing, so `+` becomes a space, and
/// are encoded again when formatting. Parameters without `=` have an empty
/// value, and empty segments between separators are skipped.
///
/// # Examples
///
/// ```
/// use ember_serve::http::Query;
///
/// // Create query string from string
/// let query = Query::from("tag=a&tag=b&q=hello+world");
/// assert_eq!(query.get("q"), Some("hello world"));
/// assert_eq!(query.get_all("tag").collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query<'a> {
    /// List of parameters.
    inner: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Query<'a> {
    /// Returns the first value for the given key.
    pub fn get<K>(&self, key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        self.get_all(key).next()
    }

    /// Returns an iterator over all values for the given key.
    pub fn get_all<K>(&self, key: K) -> impl Iterator<Item = &str>
    where
        K: AsRef<str>,
    {
        self.inner.iter().filter_map(move |(name, value)| {
            (name == key.as_ref()).then_some(value.as_ref())
        })
    }

    /// Adds the given key-value pair as a parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_serve::http::Query;
    ///
    /// // Create query string and add parameter
    /// let mut query = Query::default();
    /// query.add("q", "a&b");
    /// assert_eq!(query.to_string(), "q=a%26b");
    /// ```
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.inner.push((key.into(), value.into()));
    }
}

#[allow(clippy::must_use_candidate)]
impl Query<'_> {
    /// Returns the number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<'a> From<&'a str> for Query<'a> {
    /// Creates a query string from a string without the leading `?`.
    fn from(value: &'a str) -> Self {
        value
            .split('&')
            .filter(|param| !param.is_empty())
            .map(|param| {
                let (key, value) = param.split_once('=').unwrap_or((param, ""));
                (decode(key, true), decode(value, true))
            })
            .collect()
    }
}

impl<'a, K, V> FromIterator<(K, V)> for Query<'a>
where
    K: Into<Cow<'a, str>>,
    V: Into<Cow<'a, str>>,
{
    /// Creates a query string from an iterator.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut query = Query::default();
        for (key, value) in iter {
            query.add(key, value);
        }
        query
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Query<'_> {
    /// Formats the query string for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }

            // Write key and value, if any
            f.write_str(&encode(key))?;
            if !value.is_empty() {
                write!(f, "={}", encode(value))?;
            }
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
    fn test_query_from_str() {
        let test_cases = vec![
            ("q=rust", "q", Some("rust")),
            ("q=a+b", "q", Some("a b")),
            ("q=a%2Bb", "q", Some("a+b")),
            ("a+b=1", "a b", Some("1")),
            ("flag", "flag", Some("")),
            ("&&q=1&", "q", Some("1")),
            ("q=a=b", "q", Some("a=b")),
            ("q=1", "x", None),
            ("", "q", None),
        ];

        for (value, key, expected) in test_cases {
            let query = Query::from(value);
            assert_eq!(
                query.get(key),
                expected,
                "Failed for Query::from('{value}').get('{key}')"
            );
        }
    }

    #[test]
    fn test_query_display() {
        let query = Query::from("b=2&a=1&flag&q=x+y");
        assert_eq!(query.len(), 4);
        assert_eq!(query.to_string(), "b=2&a=1&flag&q=x%20y");
    }
}
