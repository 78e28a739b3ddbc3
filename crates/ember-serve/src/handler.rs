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

//! Handler.

use super::http::response::ResponseExt;
use super::http::{Request, Response, Status};

mod stack;

pub use stack::Stack;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Handler.
///
/// Handlers sit at the end of every request processing chain and answer each
/// [`Request`] with a [`Response`]. Handling is infallible, so errors must be
/// turned into an error response instead of being propagated.
///
/// Closures taking a request and returning anything that converts into a
/// response are handlers as well.
///
/// # Examples
///
/// ```
/// use ember_serve::handler::Handler;
/// use ember_serve::http::{Request, Response, ResponseExt};
///
/// // Create handler greeting the user by cookie
/// let handler = |req: Request| {
///     let name = req.cookie("name").unwrap_or("stranger").to_string();
///     Response::default().text(format!("Hello, {name}!"))
/// };
///
/// // Handle request with handler
/// let req = Request::default();
/// let res = handler.handle(req);
/// assert_eq!(res.body, b"Hello, stranger!");
/// ```
pub trait Handler {
    /// Handles the given request.
    fn handle(&self, req: Request) -> Response;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Fallback handler.
///
/// This handler always returns "404 Not Found", and is the default handler at
/// the end of every [`Stack`].
///
/// # Examples
///
/// ```
/// use ember_serve::handler::{Handler, NotFound};
/// use ember_serve::http::{Request, Status};
///
/// // Handle request with handler
/// let res = NotFound.handle(Request::default());
/// assert_eq!(res.status, Status::NotFound);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NotFound;

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Handler for NotFound {
    #[inline]
    fn handle(&self, _req: Request) -> Response {
        Response::from_status(Status::NotFound)
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F, R> Handler for F
where
    F: Fn(Request) -> R,
    R: Into<Response>,
{
    #[inline]
    fn handle(&self, req: Request) -> Response {
        self(req).into()
    }
}
