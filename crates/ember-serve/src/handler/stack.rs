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

//! Stack.

use crate::handler::{Handler, NotFound};
use crate::http::{Request, Response};
use crate::middleware::Middleware;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Stack.
///
/// Stacks chain middlewares, passing the request from one middleware to the
/// next, until one of them answers it. If none does, the request ends up at
/// the [`NotFound`] handler. Since a stack is a middleware itself, stacks can
/// be nested.
///
/// # Examples
///
/// ```
/// use ember_serve::handler::{Handler, Stack};
/// use ember_serve::http::{Header, Request, Response, ResponseExt, Status};
///
/// // Create stack with middleware
/// let stack = Stack::new()
///     .with(|req: Request, next: &dyn Handler| {
///         if req.cookie("session").is_some() {
///             next.handle(req)
///         } else {
///             Response::from_status(Status::Forbidden)
///         }
///     });
///
/// // Handle request with stack
/// let res = stack.handle(Request::default());
/// assert_eq!(res.status, Status::Forbidden);
///
/// // Handle request with session cookie
/// let req = Request::default().header(Header::Cookie, "session=abc");
/// let res = stack.handle(req);
/// assert_eq!(res.status, Status::NotFound);
/// ```
#[derive(Default)]
pub struct Stack {
    /// Middlewares.
    middlewares: Vec<Box<dyn Middleware>>,
}

/// Stack handler.
///
/// The stack handler keeps track of the middlewares that haven't been invoked
/// yet, and the handler to invoke once none are left.
struct StackHandler<'a> {
    /// Remaining middlewares.
    middlewares: &'a [Box<dyn Middleware>],
    /// Next handler.
    next: &'a dyn Handler,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Stack {
    /// Creates a stack.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a middleware to the end of the stack.
    #[must_use]
    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.middlewares.push(Box::new(middleware));
        self
    }
}

#[allow(clippy::must_use_candidate)]
impl Stack {
    /// Returns the number of middlewares.
    #[inline]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns whether there are any middlewares.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Middleware for Stack {
    /// Processes the given request, starting with the first middleware.
    fn process(&self, req: Request, next: &dyn Handler) -> Response {
        let handler = StackHandler {
            middlewares: &self.middlewares,
            next,
        };
        handler.handle(req)
    }
}

impl Handler for Stack {
    /// Handles the given request, passing it through the entire stack.
    #[inline]
    fn handle(&self, req: Request) -> Response {
        self.process(req, &NotFound)
    }
}

impl Handler for StackHandler<'_> {
    /// Invokes the first remaining middleware, or the next handler.
    fn handle(&self, req: Request) -> Response {
        match self.middlewares {
            [] => self.next.handle(req),
            [middleware, middlewares @ ..] => {
                let next = StackHandler { middlewares, next: self.next };
                middleware.process(req, &next)
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::http::{Header, ResponseExt, Status};

    #[test]
    fn test_stack_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&trace), Rc::clone(&trace));
        let stack = Stack::new()
            .with(move |req: Request, next: &dyn Handler| {
                a.borrow_mut().push("a");
                next.handle(req).header(Header::Server, "ember")
            })
            .with(move |req: Request, next: &dyn Handler| {
                b.borrow_mut().push("b");
                next.handle(req)
            });

        let res = stack.handle(Request::default());
        assert_eq!(res.status, Status::NotFound);
        assert_eq!(res.headers.get(Header::Server), Some("ember"));
        assert_eq!(*trace.borrow(), ["a", "b"]);
    }

    #[test]
    fn test_stack_short_circuit() {
        let stack = Stack::new()
            .with(|_: Request, _: &dyn Handler| {
                Response::from_status(Status::Forbidden)
            })
            .with(|_: Request, _: &dyn Handler| -> Response {
                unreachable!()
            });

        let res = stack.handle(Request::default());
        assert_eq!(res.status, Status::Forbidden);
    }

    #[test]
    fn test_stack_nested() {
        let inner = Stack::new().with(|_: Request, _: &dyn Handler| {
            Response::default().text("inner")
        });
        let stack = Stack::new().with(Stack::new()).with(inner);
        assert_eq!(stack.len(), 2);

        let res = stack.handle(Request::default());
        assert_eq!(res.body, b"inner");
    }
}
