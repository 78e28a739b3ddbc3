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

//! Percent-encoding of URI components.

use std::borrow::Cow;

use ember_codec::{decoded_len, encoded_len};

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Encodes a URI component.
///
/// Only ASCII letters, digits, `.`, `_` and `-` are kept verbatim, everything
/// else is written as a lowercase escape. Components that need no escaping at
/// all are borrowed.
pub fn encode(value: &str) -> Cow<'_, str> {
    let len = encoded_len(value.as_bytes());
    if len == value.len() {
        return Cow::Borrowed(value);
    }

    // Size the buffer for the encoded component and its terminator
    let mut buf = vec![0; len + 1];
    match ember_codec::encode(value.as_bytes(), &mut buf) {
        Ok(written) => Cow::Owned(String::from_utf8_lossy(&written).into()),
        Err(_) => Cow::Borrowed(value),
    }
}

/// Encodes a URI path, keeping its `/` separators intact.
pub fn encode_path(path: &str) -> Cow<'_, str> {
    let mut segments = path.split('/').map(encode);
    if segments.clone().all(|segment| matches!(segment, Cow::Borrowed(_))) {
        return Cow::Borrowed(path);
    }

    // Join encoded segments
    let mut value = String::with_capacity(path.len());
    if let Some(segment) = segments.next() {
        value.push_str(&segment);
    }
    for segment in segments {
        value.push('/');
        value.push_str(&segment);
    }
    Cow::Owned(value)
}

/// Decodes a URI component.
///
/// In form mode, `+` decodes to a space, which is how query strings encode
/// them. Decoded bytes that are not valid UTF-8 are replaced, and components
/// without any escapes are borrowed.
pub fn decode(value: &str, form: bool) -> Cow<'_, str> {
    if !value.contains('%') && !(form && value.contains('+')) {
        return Cow::Borrowed(value);
    }

    // Size the buffer for the decoded component and its terminator
    let mut buf = vec![0; decoded_len(value.as_bytes(), form) + 1];
    match ember_codec::decode(value.as_bytes(), &mut buf, form) {
        Ok(written) => Cow::Owned(String::from_utf8_lossy(&written).into()),
        Err(_) => Cow::Borrowed(value),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let test_cases = vec![
            ("index.html", "index.html"),
            ("a b", "a%20b"),
            ("ä", "%c3%a4"),
            ("a&b=c", "a%26b%3dc"),
        ];

        for (value, expected) in test_cases {
            assert_eq!(encode(value), expected, "Failed for encode('{value}')");
        }
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/docs/index.html"), "/docs/index.html");
        assert_eq!(encode_path("/a b/c"), "/a%20b/c");
        assert!(matches!(encode_path("/plain/"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode() {
        let test_cases = vec![
            ("plain", false, "plain"),
            ("a%20b", false, "a b"),
            ("a+b", false, "a+b"),
            ("a+b", true, "a b"),
            ("%c3%a4", true, "ä"),
            ("%zz", false, "%zz"),
            ("%ff", false, "\u{fffd}"),
        ];

        for (value, form, expected) in test_cases {
            assert_eq!(
                decode(value, form),
                expected,
                "Failed for decode('{value}', {form})"
            );
        }
    }

    #[test]
    fn test_decode_borrows_without_escapes() {
        assert!(matches!(decode("/docs/", false), Cow::Borrowed(_)));
        assert!(matches!(decode("a+b", false), Cow::Borrowed(_)));
        assert!(matches!(decode("a+b", true), Cow::Owned(_)));
    }
}
