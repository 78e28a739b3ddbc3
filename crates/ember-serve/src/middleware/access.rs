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

//! Middleware for access logging.

use std::time::Instant;
use tracing::info;

use crate::handler::Handler;
use crate::http::{Request, Response};
use crate::middleware::Middleware;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Middleware for access logging.
///
/// Emits one `tracing` event per request after it was handled, carrying the
/// method, path, status and the time it took to produce the response. Add it
/// first to a stack, so the elapsed time covers all other middlewares.
///
/// # Examples
///
/// ```
/// use ember_serve::handler::{Handler, Stack};
/// use ember_serve::http::{Request, Status};
/// use ember_serve::middleware::AccessLog;
///
/// // Create stack with access log
/// let stack = Stack::new().with(AccessLog);
///
/// // Handle request with stack
/// let res = stack.handle(Request::default());
/// assert_eq!(res.status, Status::NotFound);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessLog;

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Middleware for AccessLog {
    fn process(&self, req: Request, next: &dyn Handler) -> Response {
        let method = req.method;
        let path = req.uri.path.to_string();

        // Handle request and measure elapsed time
        let start = Instant::now();
        let res = next.handle(req);
        info!(
            target: "ember::access",
            %method,
            %path,
            status = res.status.code(),
            bytes = res.body.len(),
            elapsed = ?start.elapsed(),
            "request"
        );
        res
    }
}
