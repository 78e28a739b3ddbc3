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

//! Middleware for serving static files.

use httpdate::parse_http_date;
use std::io::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::handler::Handler;
use crate::http::response::ResponseExt;
use crate::http::{Header, Method, Request, Response, Status, Uri};
use crate::middleware::Middleware;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Middleware for serving static files.
///
/// Serves `GET` and `HEAD` requests from the document root. Paths ending in a
/// slash resolve to `index.html`, and directories requested without a slash
/// are redirected to the slashed path, so relative links keep working. All
/// other requests, and files that can't be found, are passed on to the next
/// handler. If that handler doesn't find anything either, `404.html` from the
/// document root is served, if it exists.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_serve::handler::{Handler, Stack};
/// use ember_serve::http::{Request, Status};
/// use ember_serve::middleware::StaticFiles;
///
/// // Create stack serving the current directory
/// let stack = Stack::new().with(StaticFiles::new(".")?);
///
/// // Handle request with stack
/// let res = stack.handle(Request::default().uri("/missing.html"));
/// assert_eq!(res.status, Status::NotFound);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StaticFiles {
    /// Document root.
    base: PathBuf,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl StaticFiles {
    /// Creates a middleware for serving static files.
    ///
    /// # Errors
    ///
    /// This method returns [`std::io::Error`] if the document root doesn't
    /// exist or can't be canonicalized.
    pub fn new<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        path.as_ref().canonicalize().map(|base| Self { base })
    }

    /// Resolves the request path to a file inside the document root.
    ///
    /// Symbolic links pointing outside of the document root are rejected, as
    /// the canonicalized path must still start with it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut full = self.base.join(path.trim_start_matches('/'));
        if path.ends_with('/') {
            full.push("index.html");
        }
        full.canonicalize()
            .ok()
            .filter(|full| full.starts_with(&self.base))
    }

    /// Passes the request on, serving `404.html` if nothing was found.
    fn fallback(&self, req: Request, next: &dyn Handler) -> Response {
        let res = next.handle(req);
        if res.status == Status::NotFound {
            if let Ok(page) = Response::from_file(self.base.join("404.html")) {
                return page.status(Status::NotFound);
            }
        }

        // Otherwise, return original response
        res
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Middleware for StaticFiles {
    fn process(&self, req: Request, next: &dyn Handler) -> Response {
        if !matches!(req.method, Method::Get | Method::Head) {
            return self.fallback(req, next);
        }

        // Resolve file, or delegate to fallback
        let Some(full) = self.resolve(&req.uri.path) else {
            return self.fallback(req, next);
        };

        // Redirect directories to their slashed path
        if full.is_dir() {
            let path = format!("{}/", req.uri.path);
            let uri = Uri::from_parts(path, req.uri.query.clone());
            return Response::redirect(uri);
        }

        // Attempt to load file, or delegate to fallback
        let Ok(res) = Response::from_file(&full) else {
            return self.fallback(req, next);
        };

        // Answer with 304, if the file wasn't modified since the given date,
        // subtracting one second, as HTTP dates have no sub-second precision
        let since = req.headers.get(Header::IfModifiedSince);
        let since = since.and_then(|value| parse_http_date(value).ok());
        let last = full.metadata().and_then(|meta| meta.modified()).ok();
        if let (Some(since), Some(last)) = (since, last) {
            if since >= last - Duration::from_secs(1) {
                let mut res = res.status(Status::NotModified).body([]);
                res.headers.remove(Header::ContentLength);
                res.headers.remove(Header::ContentType);
                return res;
            }
        }

        // Keep headers, but drop the body for head requests
        if req.method == Method::Head {
            res.body([])
        } else {
            res
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use httpdate::fmt_http_date;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    use super::*;
    use crate::handler::Stack;

    /// Creates a document root with a few files.
    fn document_root() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Home</h1>").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
        fs::write(dir.path().join("docs/a b.txt"), "spaced").unwrap();
        dir
    }

    #[test]
    fn test_serve() {
        let dir = document_root();
        let stack = Stack::new().with(StaticFiles::new(dir.path()).unwrap());

        let test_cases = vec![
            ("/", Status::Ok, "<h1>Home</h1>"),
            ("/index.html", Status::Ok, "<h1>Home</h1>"),
            ("/docs/", Status::Ok, "docs"),
            ("/docs/a%20b.txt", Status::Ok, "spaced"),
            ("/missing.html", Status::NotFound, "Not Found"),
        ];

        for (path, status, body) in test_cases {
            let res = stack.handle(Request::default().uri(path));
            assert_eq!(res.status, status, "Failed for status of {path}");
            assert_eq!(res.body, body.as_bytes(), "Failed for body of {path}");
        }
    }

    #[test]
    fn test_serve_redirects_directories() {
        let dir = document_root();
        let stack = Stack::new().with(StaticFiles::new(dir.path()).unwrap());

        let res = stack.handle(Request::default().uri("/docs?q=1"));
        assert_eq!(res.status, Status::MovedPermanently);
        assert_eq!(res.headers.get(Header::Location), Some("/docs/?q=1"));
    }

    #[test]
    fn test_serve_head() {
        let dir = document_root();
        let stack = Stack::new().with(StaticFiles::new(dir.path()).unwrap());

        let req = Request::default().method(Method::Head).uri("/");
        let res = stack.handle(req);
        assert_eq!(res.status, Status::Ok);
        assert_eq!(res.headers.get(Header::ContentLength), Some("13"));
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_serve_not_modified() {
        let dir = document_root();
        let stack = Stack::new().with(StaticFiles::new(dir.path()).unwrap());

        let now = fmt_http_date(SystemTime::now() + Duration::from_secs(5));
        let req = Request::default()
            .uri("/")
            .header(Header::IfModifiedSince, now);
        let res = stack.handle(req);
        assert_eq!(res.status, Status::NotModified);
        assert!(res.body.is_empty());

        let req = Request::default()
            .uri("/")
            .header(Header::IfModifiedSince, "Thu, 01 Jan 1970 00:00:00 GMT");
        let res = stack.handle(req);
        assert_eq!(res.status, Status::Ok);
    }

    #[test]
    fn test_serve_custom_not_found() {
        let dir = document_root();
        fs::write(dir.path().join("404.html"), "gone").unwrap();
        let stack = Stack::new().with(StaticFiles::new(dir.path()).unwrap());

        let res = stack.handle(Request::default().uri("/missing"));
        assert_eq!(res.status, Status::NotFound);
        assert_eq!(res.body, b"gone");

        let req = Request::default().method(Method::Post).uri("/");
        let res = stack.handle(req);
        assert_eq!(res.status, Status::NotFound);
        assert_eq!(res.body, b"gone");
    }

    #[test]
    fn test_new_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StaticFiles::new(dir.path().join("missing")).is_err());
    }
}
