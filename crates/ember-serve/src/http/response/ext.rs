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

//! HTTP response constructors.

use httpdate::fmt_http_date;
use std::fs;
use std::path::Path;

use crate::http::{Header, Status};

use super::{Response, Result};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Extension trait for the `Response` type providing constructors.
pub trait ResponseExt: Sized {
    /// Creates a response from a file.
    ///
    /// The content type is derived from the file extension, and the time of
    /// last modification is sent as `Last-Modified`, if the platform knows it.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Io`][] if the file can't be read.
    ///
    /// [`Error::Io`]: super::Error::Io
    fn from_file<P>(path: P) -> Result<Response>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let content = fs::read(path)?;
        let res = Response::default()
            .header(Header::ContentType, mime_type(path))
            .header(Header::ContentLength, content.len())
            .body(content);

        // Add time of last modification, if available
        match fs::metadata(path)?.modified() {
            Ok(time) => Ok(res.header(Header::LastModified, fmt_http_date(time))),
            Err(_) => Ok(res),
        }
    }

    /// Creates a response from a status, with its reason as body.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_serve::http::{Header, Response, ResponseExt, Status};
    ///
    /// // Create response from status
    /// let res = Response::from_status(Status::NotFound);
    /// assert_eq!(res.body, b"Not Found");
    /// assert_eq!(res.headers.get(Header::ContentLength), Some("9"));
    /// ```
    #[must_use]
    fn from_status(status: Status) -> Response {
        Response::default() // fmt
            .status(status)
            .text(status.name())
    }

    /// Creates a redirect response.
    #[must_use]
    fn redirect<L>(location: L) -> Response
    where
        L: ToString,
    {
        Response::default()
            .status(Status::MovedPermanently)
            .header(Header::Location, location)
            .header(Header::ContentLength, 0)
    }

    /// Sets the given text as the body of the response.
    #[must_use]
    fn text<S>(self, content: S) -> Response
    where
        S: Into<String>;
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl ResponseExt for Response {
    fn text<S>(self, content: S) -> Response
    where
        S: Into<String>,
    {
        let content = content.into();
        self.header(Header::ContentType, "text/plain; charset=utf-8")
            .header(Header::ContentLength, content.len())
            .body(content)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the content type for the given path.
fn mime_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|ext| ext.to_str());
    match ext.map(str::to_ascii_lowercase).as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_mime_type() {
        let test_cases = vec![
            ("index.html", "text/html; charset=utf-8"),
            ("INDEX.HTM", "text/html; charset=utf-8"),
            ("app.js", "text/javascript; charset=utf-8"),
            ("logo.svg", "image/svg+xml"),
            ("archive.tar.gz", "application/octet-stream"),
            ("Makefile", "application/octet-stream"),
        ];

        for (path, expected) in test_cases {
            let mime = mime_type(Path::new(path));
            assert_eq!(mime, expected, "Failed for mime_type('{path}')");
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let res = Response::from_file(file.path()).unwrap();
        assert_eq!(res.status, Status::Ok);
        assert_eq!(res.body, b"hello");
        assert_eq!(res.headers.get(Header::ContentLength), Some("5"));
        assert_eq!(
            res.headers.get(Header::ContentType),
            Some("text/plain; charset=utf-8")
        );
        assert!(res.headers.contains(Header::LastModified));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let res = Response::from_file(dir.path().join("missing.html"));
        assert!(res.is_err());
    }
}
