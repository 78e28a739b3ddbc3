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

//! Percent-encoding.

use percent_encoding::{
    percent_decode, percent_encode, AsciiSet, NON_ALPHANUMERIC,
};
use std::slice;

use super::error::Result;
use super::output::{Output, Written};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Character set to be percent-encoded, i.e., all but `[A-Za-z0-9._-]`.
#[rustfmt::skip]
const SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.').remove(b'_').remove(b'-');

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Percent-encodes the given bytes into the given buffer.
///
/// Alphanumeric characters and `.`, `_` and `-` are copied verbatim, all other
/// bytes are written as `%xx` with lowercase hexadecimal digits. Escapes are
/// only written as a whole, and the buffer is always NUL-terminated, even if
/// encoding fails, so the prefix that fit remains readable.
///
/// # Errors
///
/// This function returns [`Error::BufferTooSmall`][] if the encoded bytes and
/// the terminator don't fit into the buffer.
///
/// [`Error::BufferTooSmall`]: crate::Error::BufferTooSmall
///
/// # Examples
///
/// ```
/// use ember_codec::{encode, Error};
///
/// // Encode into buffer
/// let mut buf = [0u8; 20];
/// let res = encode(b"a%b/c&d.e", &mut buf);
/// assert_eq!(res.map(|written| written.len()), Ok(15));
/// assert_eq!(&buf[..16], b"a%25b%2fc%26d.e\0");
///
/// // Encode into buffer that is too small
/// let mut buf = [0u8; 4];
/// assert_eq!(encode(b"%%%", &mut buf), Err(Error::BufferTooSmall));
/// assert_eq!(&buf, b"%25\0");
/// ```
pub fn encode<'a>(input: &[u8], buf: &'a mut [u8]) -> Result<Written<'a>> {
    let mut output = Output::new(buf)?;

    // The encoder yields either verbatim runs of the input or escapes, which
    // always use uppercase hexadecimal digits, so we need to convert them
    for chunk in percent_encode(input, SET) {
        let fits = match *chunk.as_bytes() {
            [b'%', hi, lo] => output.push(&[
                b'%',
                hi.to_ascii_lowercase(),
                lo.to_ascii_lowercase(),
            ]),
            ref bytes => bytes
                .iter()
                .all(|byte| output.push(slice::from_ref(byte))),
        };

        // Stop at the first write that doesn't fit
        if !fits {
            return Err(output.overflow());
        }
    }

    // No errors occurred
    Ok(output.finish())
}

/// Percent-decodes the given bytes into the given buffer.
///
/// Each `%XX` escape with two hexadecimal digits is decoded into one byte. A
/// `%` that isn't followed by two hexadecimal digits within the input, which
/// includes incomplete escapes at the end of the input, is copied verbatim.
/// If `form` is set, `+` is decoded as a space, as used by form submissions,
/// while an escaped `%2B` always decodes to `+`.
///
/// Only the given slice is decoded, so a substring of a larger buffer can be
/// decoded by passing a subslice.
///
/// # Errors
///
/// This function returns [`Error::BufferTooSmall`][] if the decoded bytes and
/// the terminator don't fit into the buffer.
///
/// [`Error::BufferTooSmall`]: crate::Error::BufferTooSmall
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_codec::decode;
///
/// // Decode form value
/// let mut buf = [0u8; 20];
/// assert_eq!(decode(b"x+y", &mut buf, true)?, "x y");
///
/// // Decode prefix of input
/// let mut buf = [0u8; 20];
/// assert_eq!(decode(&b"abcdef"[..3], &mut buf, false)?, "abc");
/// # Ok(())
/// # }
/// ```
pub fn decode<'a>(
    input: &[u8], buf: &'a mut [u8], form: bool,
) -> Result<Written<'a>> {
    let mut output = Output::new(buf)?;
    for (n, segment) in segments(input, form).enumerate() {
        if n > 0 && !output.push(b" ") {
            return Err(output.overflow());
        }

        // Decode segment byte by byte, stopping at the first byte that doesn't
        // fit, so the buffer never contains more than the capacity allows
        for byte in percent_decode(segment) {
            if !output.push(&[byte]) {
                return Err(output.overflow());
            }
        }
    }

    // No errors occurred
    Ok(output.finish())
}

// ----------------------------------------------------------------------------

/// Returns the length of the percent-encoded bytes, excluding the terminator.
///
/// # Examples
///
/// ```
/// use ember_codec::encoded_len;
///
/// // Compute encoded length
/// assert_eq!(encoded_len(b"a%b/c&d.e"), 15);
/// ```
#[must_use]
pub fn encoded_len(input: &[u8]) -> usize {
    percent_encode(input, SET).map(str::len).sum()
}

/// Returns the length of the percent-decoded bytes, excluding the terminator.
///
/// # Examples
///
/// ```
/// use ember_codec::decoded_len;
///
/// // Compute decoded length
/// assert_eq!(decoded_len(b"%25+%2", true), 4);
/// ```
#[must_use]
pub fn decoded_len(input: &[u8], form: bool) -> usize {
    segments(input, form)
        .enumerate()
        .map(|(n, segment)| {
            usize::from(n > 0) + percent_decode(segment).count()
        })
        .sum()
}

/// Splits the input at `+` in form mode, as `+` is never part of an escape.
fn segments(input: &[u8], form: bool) -> impl Iterator<Item = &[u8]> {
    input.split(move |&byte| form && byte == b'+')
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{status_code, Error};

    /// Filler written to buffers before each call.
    const FILL: u8 = 77;

    /// Returns the buffer contents up to the first NUL.
    fn terminated(buf: &[u8]) -> &[u8] {
        let end = buf.iter().position(|&byte| byte == 0).unwrap_or(buf.len());
        &buf[..end]
    }

    #[test]
    fn test_encode() {
        let test_cases = vec![
            ("abc", "abc"),
            ("a%b/c&d.e", "a%25b%2fc%26d.e"),
            ("", ""),
            ("A-Z_0.9", "A-Z_0.9"),
            ("a b+c", "a%20b%2bc"),
            ("~!*'()", "%7e%21%2a%27%28%29"),
            ("ü", "%c3%bc"),
        ];

        for (input, expected) in test_cases {
            let mut buf = [FILL; 32];
            let res = encode(input.as_bytes(), &mut buf);
            let res = res.map(|written| written.as_bytes());
            assert_eq!(res, Ok(expected.as_bytes()), "Failed for: {input}");
            assert_eq!(buf[expected.len()], 0, "Missing NUL for: {input}");
            assert_eq!(encoded_len(input.as_bytes()), expected.len());
        }
    }

    #[test]
    fn test_encode_status() {
        let mut buf = [FILL; 20];
        assert_eq!(status_code(&encode(b"abc", &mut buf)), 3);
        assert_eq!(terminated(&buf), b"abc");

        let mut buf = [FILL; 20];
        assert_eq!(status_code(&encode(b"a%b/c&d.e", &mut buf)), 15);
        assert_eq!(terminated(&buf), b"a%25b%2fc%26d.e");

        let mut buf = [FILL; 20];
        assert_eq!(status_code(&encode(b"%%%", &mut buf[..4])), -1);
        assert_eq!(terminated(&buf), b"%25");
    }

    #[test]
    fn test_encode_keeps_escapes_whole() {
        let mut buf = [FILL; 8];
        let res = encode(b"ab%", &mut buf[..5]);
        assert_eq!(res, Err(Error::BufferTooSmall));
        assert_eq!(terminated(&buf), b"ab");
        assert_eq!(&buf[5..], &[FILL; 3]);
    }

    #[test]
    fn test_encode_empty_buffer() {
        let mut buf = [FILL; 1];
        assert_eq!(encode(b"", &mut buf[..0]), Err(Error::BufferTooSmall));
        assert_eq!(buf, [FILL]);
        assert_eq!(encode(b"", &mut buf).map(|w| w.len()), Ok(0));
        assert_eq!(buf, [0]);
    }

    #[test]
    fn test_encode_truncated_capacities() {
        let inputs: [&[u8]; 4] =
            [b"abc", b"a%b/c&d.e", b"%%%", &[0x00, 0x7f, 0x80, 0xff, b'z']];
        for input in inputs {
            let required = encoded_len(input) + 1;
            for capacity in 0..required {
                let mut buf = [FILL; 64];
                let res = encode(input, &mut buf[..capacity]);
                assert_eq!(res, Err(Error::BufferTooSmall));
                assert!(
                    buf[capacity..].iter().all(|&byte| byte == FILL),
                    "Wrote past capacity {capacity} for input: {input:?}"
                );
            }
            let mut buf = [FILL; 64];
            let res = encode(input, &mut buf[..required]);
            assert_eq!(res.map(|written| written.len()), Ok(required - 1));
        }
    }

    #[test]
    fn test_decode() {
        let test_cases = vec![
            ("abc", false, "abc"),
            ("x+y", false, "x+y"),
            ("x+y", true, "x y"),
            ("%25", true, "%"),
            ("%2B+%2b", true, "+ +"),
            ("%41%4a%4A", false, "AJJ"),
            ("%", false, "%"),
            ("%2", false, "%2"),
            ("%zz", false, "%zz"),
            ("%%41", false, "%A"),
            ("%+2", true, "% 2"),
            ("a%2+", true, "a%2 "),
            ("++", true, "  "),
            ("", true, ""),
        ];

        for (input, form, expected) in test_cases {
            let mut buf = [FILL; 32];
            let res = decode(input.as_bytes(), &mut buf, form);
            let res = res.map(|written| written.as_bytes());
            assert_eq!(res, Ok(expected.as_bytes()), "Failed for: {input}");
            assert_eq!(buf[expected.len()], 0, "Missing NUL for: {input}");
            assert_eq!(decoded_len(input.as_bytes(), form), expected.len());
        }
    }

    #[test]
    fn test_decode_status() {
        let mut buf = [FILL; 20];
        assert_eq!(status_code(&decode(b"abc", &mut buf, false)), 3);
        assert_eq!(terminated(&buf), b"abc");

        let mut buf = [FILL; 20];
        assert_eq!(status_code(&decode(&b"abcdef"[..3], &mut buf, false)), 3);
        assert_eq!(terminated(&buf), b"abc");

        let mut buf = [FILL; 20];
        assert_eq!(status_code(&decode(b"x+y", &mut buf, false)), 3);
        assert_eq!(terminated(&buf), b"x+y");

        let mut buf = [FILL; 20];
        assert_eq!(status_code(&decode(b"x+y", &mut buf, true)), 3);
        assert_eq!(terminated(&buf), b"x y");

        let mut buf = [FILL; 20];
        assert_eq!(status_code(&decode(b"%25", &mut buf, true)), 1);
        assert_eq!(terminated(&buf), b"%");
    }

    #[test]
    fn test_decode_escape_cut_by_length() {
        let input = b"a%25";
        let mut buf = [FILL; 8];
        let res = decode(&input[..3], &mut buf, false);
        assert_eq!(res.map(|written| written.as_bytes()), Ok(&b"a%2"[..]));
    }

    #[test]
    fn test_decode_non_utf8() {
        let mut buf = [FILL; 8];
        let written = decode(b"%ff%00", &mut buf, false).unwrap();
        assert_eq!(written.as_bytes(), &[0xff, 0x00]);
        assert!(written.to_str().is_err());
    }

    #[test]
    fn test_decode_truncated_capacities() {
        let inputs: [(&[u8], bool); 4] = [
            (b"abc", false),
            (b"x+y", true),
            (b"%25%41b%zz", false),
            (b"a+b%2Bc", true),
        ];
        for (input, form) in inputs {
            let required = decoded_len(input, form) + 1;
            for capacity in 0..required {
                let mut buf = [FILL; 64];
                let res = decode(input, &mut buf[..capacity], form);
                assert_eq!(res, Err(Error::BufferTooSmall));
                assert!(
                    buf[capacity..].iter().all(|&byte| byte == FILL),
                    "Wrote past capacity {capacity} for input: {input:?}"
                );
                if capacity > 0 {
                    let nul = buf[..capacity].iter().filter(|&&b| b == 0);
                    assert_eq!(nul.count(), 1, "Missing NUL for: {input:?}");
                }
            }
            let mut buf = [FILL; 64];
            let res = decode(input, &mut buf[..required], form);
            assert_eq!(res.map(|written| written.len()), Ok(required - 1));
        }
    }

    #[test]
    fn test_decode_is_identity_without_escapes() {
        let inputs = ["", "abc", "a/b?c=d&e", "hello world", "ünïcödé"];
        for input in inputs {
            for form in [false, true] {
                let mut buf = [FILL; 32];
                let once = decode(input.as_bytes(), &mut buf, form).unwrap();
                assert_eq!(once, input, "Failed for input: {input}");

                // Decoding the decoded bytes again must not change them
                let mut again = [FILL; 32];
                let twice = decode(once.as_bytes(), &mut again, form).unwrap();
                assert_eq!(twice, input, "Failed for input: {input}");
            }
        }
    }
}
