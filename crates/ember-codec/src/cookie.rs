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

//! Cookie extraction.

use std::iter::{self, Chain, Once};
use std::str::CharIndices;

use super::error::{Argument, Error, Result};
use super::output::{Output, Written};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Iterator over the pairs of a `Cookie` header value.
///
/// The header is scanned in a single pass, character by character, appending
/// a sentinel `;` separator to the end of the input, so the last pair doesn't
/// need to be handled outside of the scan. Names and values are trimmed, and
/// empty segments, i.e., repeated or trailing separators, are skipped.
///
/// # Examples
///
/// ```
/// use ember_codec::{Cookies, Pair};
///
/// // Iterate over cookie pairs
/// let mut cookies = Cookies::new("a=1; b=2; c");
/// assert_eq!(cookies.next(), Some(Pair { name: "a", value: Some("1") }));
/// assert_eq!(cookies.next(), Some(Pair { name: "b", value: Some("2") }));
/// assert_eq!(cookies.next(), Some(Pair { name: "c", value: None }));
/// assert_eq!(cookies.next(), None);
/// ```
#[derive(Clone, Debug)]
pub struct Cookies<'a> {
    /// Header value.
    header: &'a str,
    /// Character iterator, including the sentinel.
    iter: Chain<CharIndices<'a>, Once<(usize, char)>>,
    /// Start offset of the current pair.
    start: usize,
}

/// Cookie pair.
///
/// A pair without `=` is a bare token, which has a name, but no value. This
/// is different from a pair with an empty value, e.g. `a=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pair<'a> {
    /// Cookie name.
    pub name: &'a str,
    /// Cookie value, if any.
    pub value: Option<&'a str>,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Scanner state.
#[derive(Clone, Copy)]
enum State {
    /// Scanning a name that starts at the given offset.
    Name(usize),
    /// Scanning a value after the name and `=` at the given offsets.
    Value(usize, usize),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> Cookies<'a> {
    /// Creates an iterator over the pairs of a `Cookie` header value.
    #[must_use]
    pub fn new(header: &'a str) -> Self {
        let iter = header.char_indices();
        Self {
            header,
            iter: iter.chain(iter::once((header.len(), ';'))),
            start: 0,
        }
    }
}

impl<'a> Pair<'a> {
    /// Creates a pair from the raw name and value.
    fn new(name: &'a str, value: Option<&'a str>) -> Self {
        Self {
            name: name.trim_ascii(),
            value: value.map(|value| unquote(value.trim_ascii())),
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<'a> Iterator for Cookies<'a> {
    type Item = Pair<'a>;

    /// Returns the next pair.
    fn next(&mut self) -> Option<Self::Item> {
        let mut state = State::Name(self.start);
        for (i, char) in &mut self.iter {
            match (state, char) {
                // The first `=` ends the name - all further `=` separators are
                // treated as verbatim characters of the value
                (State::Name(start), '=') => {
                    state = State::Value(start, i);
                }

                // A `;` while scanning a name ends a bare token, which we only
                // emit if it's not empty, e.g., for `;;` or a trailing `;`
                (State::Name(start), ';') => {
                    self.start = i + 1;
                    let pair = Pair::new(&self.header[start..i], None);
                    if !pair.name.is_empty() {
                        return Some(pair);
                    }
                    state = State::Name(self.start);
                }

                // A `;` while scanning a value ends the pair
                (State::Value(start, eq), ';') => {
                    self.start = i + 1;
                    return Some(Pair::new(
                        &self.header[start..eq],
                        Some(&self.header[eq + 1..i]),
                    ));
                }

                // Consume all other characters
                _ => {}
            }
        }

        // Input exhausted
        None
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the value of the cookie with the given name.
///
/// Names are matched exactly and case-sensitively, and the first pair with a
/// matching name and a value wins. Bare tokens never match.
///
/// # Examples
///
/// ```
/// use ember_codec::find_cookie;
///
/// // Find cookie values
/// assert_eq!(find_cookie("a=1; b=2; c; d", "b"), Some("2"));
/// assert_eq!(find_cookie("a=1; b=2; c; d", "c"), None);
/// ```
#[must_use]
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    Cookies::new(header).find_map(|pair| {
        if pair.name == name { pair.value } else { None }
    })
}

/// Copies the value of the cookie with the given name into the given buffer.
///
/// The buffer is NUL-terminated on success, and holds the empty string when
/// the lookup fails for any reason other than a zero-capacity buffer. Values
/// are either copied as a whole or not at all.
///
/// # Errors
///
/// The following errors are checked in order:
///
/// - [`Error::InvalidArgument`] with [`Argument::Buffer`]: buffer is empty.
/// - [`Error::InvalidArgument`] with [`Argument::Key`]: key is empty.
/// - [`Error::KeyNotFound`]: key is absent, or only present as bare token.
/// - [`Error::BufferTooSmall`]: value and terminator don't fit.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_codec::get_cookie;
///
/// // Copy cookie value into buffer
/// let mut buf = [0u8; 20];
/// let value = get_cookie("a=1; b=123", "b", &mut buf)?;
/// assert_eq!(value, "123");
/// # Ok(())
/// # }
/// ```
pub fn get_cookie<'a>(
    header: &str, key: &str, buf: &'a mut [u8],
) -> Result<Written<'a>> {
    let Some(first) = buf.first_mut() else {
        return Err(Error::InvalidArgument(Argument::Buffer));
    };

    // Ensure the buffer holds a valid string, whatever happens next
    *first = 0;
    if key.is_empty() {
        return Err(Error::InvalidArgument(Argument::Key));
    }

    // Look up value and copy it as a whole, if it fits
    let value = find_cookie(header, key).ok_or(Error::KeyNotFound)?;
    let mut output = Output::new(buf)?;
    if output.push(value.as_bytes()) {
        Ok(output.finish())
    } else {
        Err(output.overflow())
    }
}

/// Removes a single pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status_code;

    /// Filler written to buffers before each call.
    const FILL: u8 = 77;

    #[test]
    fn test_get_cookie_status() {
        let header = "a=1; b=2; c; d";
        let mut buf = [FILL; 20];

        assert_eq!(status_code(&get_cookie("", "foo", &mut [])), -2);
        assert_eq!(status_code(&get_cookie("", "foo", &mut buf[..0])), -2);
        assert_eq!(status_code(&get_cookie("", "foo", &mut buf)), -1);
        assert_eq!(status_code(&get_cookie("", "", &mut buf)), -1);

        assert_eq!(status_code(&get_cookie(header, "a", &mut buf)), 1);
        assert_eq!(&buf[..2], b"1\0");
        assert_eq!(status_code(&get_cookie(header, "b", &mut buf)), 1);
        assert_eq!(&buf[..2], b"2\0");
        assert_eq!(status_code(&get_cookie("a=1; b=123", "b", &mut buf)), 3);
        assert_eq!(&buf[..4], b"123\0");
        assert_eq!(status_code(&get_cookie(header, "c", &mut buf)), -1);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_get_cookie_errors() {
        let mut buf = [FILL; 20];
        assert_eq!(
            get_cookie("a=1", "a", &mut buf[..0]),
            Err(Error::InvalidArgument(Argument::Buffer))
        );
        assert_eq!(
            get_cookie("a=1", "", &mut buf[..0]),
            Err(Error::InvalidArgument(Argument::Buffer))
        );
        assert_eq!(buf[0], FILL);
        assert_eq!(
            get_cookie("a=1", "", &mut buf),
            Err(Error::InvalidArgument(Argument::Key))
        );
        assert_eq!(get_cookie("a=1", "b", &mut buf), Err(Error::KeyNotFound));
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_find_cookie() {
        let test_cases = vec![
            ("a=1; b=2; c; d", "a", Some("1")),
            ("a=1; b=2; c; d", "d", None),
            ("a=1;b=2", "b", Some("2")),
            ("  a = 1 ;\tb=2  ", "a", Some("1")),
            ("a=1;; ;b=2;", "b", Some("2")),
            ("a=1; a=2", "a", Some("1")),
            ("c; c=3", "c", Some("3")),
            ("a=b=c", "a", Some("b=c")),
            ("a=", "a", Some("")),
            ("a=\"quoted value\"", "a", Some("quoted value")),
            ("a=\"", "a", Some("\"")),
            ("A=1", "a", None),
            ("ba=1; a=2", "a", Some("2")),
            ("ab=1", "b", None),
            ("", "a", None),
            (";;;", "a", None),
            ("=1", "", Some("1")),
        ];

        for (header, name, expected) in test_cases {
            let value = find_cookie(header, name);
            assert_eq!(
                value, expected,
                "Failed for find_cookie('{header}', '{name}')"
            );
        }
    }

    #[test]
    fn test_cookies() {
        let pairs: Vec<_> = Cookies::new(" a=1 ;; b = x=y ; c ;d;").collect();
        assert_eq!(
            pairs,
            vec![
                Pair { name: "a", value: Some("1") },
                Pair { name: "b", value: Some("x=y") },
                Pair { name: "c", value: None },
                Pair { name: "d", value: None },
            ]
        );
    }

    #[test]
    fn test_cookies_unicode() {
        let pairs: Vec<_> = Cookies::new("näme=välue; ö").collect();
        assert_eq!(
            pairs,
            vec![
                Pair { name: "näme", value: Some("välue") },
                Pair { name: "ö", value: None },
            ]
        );
    }

    #[test]
    fn test_get_cookie_truncated_capacities() {
        let header = "session=0123456789; theme=dark";
        for capacity in 1..11 {
            let mut buf = [FILL; 16];
            let res = get_cookie(header, "session", &mut buf[..capacity]);
            assert_eq!(res, Err(Error::BufferTooSmall));
            assert_eq!(buf[0], 0, "Missing NUL for capacity {capacity}");
            assert!(
                buf[1..].iter().all(|&byte| byte == FILL),
                "Wrote past terminator for capacity {capacity}"
            );
        }

        let mut buf = [FILL; 16];
        let res = get_cookie(header, "session", &mut buf[..11]);
        assert_eq!(res.map(|written| written.len()), Ok(10));
        assert_eq!(&buf[..12], b"0123456789\0M");
    }
}
