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

//! Middleware.

use super::handler::Handler;
use super::http::{Request, Response};

mod access;
mod files;

pub use access::AccessLog;
pub use files::StaticFiles;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Middleware.
///
/// Middlewares either answer a [`Request`] with a [`Response`] themselves, or
/// pass it on to the next [`Handler`], possibly altering the request before,
/// or the response after. Middlewares consume the request, as it moves along
/// a pipeline, usually assembled with a [`Stack`][].
///
/// [`Stack`]: crate::handler::Stack
///
/// # Examples
///
/// ```
/// use ember_serve::handler::{Handler, NotFound};
/// use ember_serve::http::{Request, Response, ResponseExt, Status};
/// use ember_serve::middleware::Middleware;
///
/// // Define middleware
/// struct RequireSession;
///
/// // Create middleware implementation
/// impl Middleware for RequireSession {
///     fn process(&self, req: Request, next: &dyn Handler) -> Response {
///         match req.cookie("session") {
///             Some(_) => next.handle(req),
///             None => Response::from_status(Status::Forbidden),
///         }
///     }
/// }
///
/// // Handle request with middleware
/// let res = RequireSession.process(Request::default(), &NotFound);
/// assert_eq!(res.status, Status::Forbidden);
/// ```
pub trait Middleware: 'static {
    /// Processes the given request.
    fn process(&self, req: Request, next: &dyn Handler) -> Response;
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F, R> Middleware for F
where
    F: Fn(Request, &dyn Handler) -> R + 'static,
    R: Into<Response>,
{
    #[inline]
    fn process(&self, req: Request, next: &dyn Handler) -> Response {
        self(req, next).into()
    }
}
