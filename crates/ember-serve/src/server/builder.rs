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

//! HTTP server builder.

use mio::net::TcpListener;
use mio::{Interest, Token};
use slab::Slab;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use tracing::info;

use crate::handler::Handler;

use super::poller::Poller;
use super::{Error, Result, Server};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP server builder.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_serve::handler::NotFound;
/// use ember_serve::server::Server;
///
/// // Create server on an ephemeral port
/// let server = Server::builder(NotFound)
///     .bind("127.0.0.1:0")?
///     .listen()?;
/// assert_eq!(server.local_addrs()?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Builder<H> {
    /// Handler for incoming requests.
    handler: H,
    /// Socket addresses to bind to.
    addrs: Vec<SocketAddr>,
    /// Idle timeout of connections.
    timeout: Duration,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<H> Builder<H>
where
    H: Handler,
{
    /// Creates a server builder.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            addrs: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Adds a socket address to bind to.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Io`] if the address can't be resolved.
    pub fn bind<A>(mut self, addr: A) -> Result<Self>
    where
        A: ToSocketAddrs,
    {
        // Resolution might yield the same address multiple times
        for addr in addr.to_socket_addrs()? {
            if !self.addrs.contains(&addr) {
                self.addrs.push(addr);
            }
        }
        Ok(self)
    }

    /// Sets the idle timeout of connections.
    ///
    /// The timeout is at least one millisecond, as a zero timeout would drop
    /// every connection before its first request is read.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// Creates the server and binds to the configured addresses.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::NoAddress`] if no address was given, and
    /// [`Error::Io`] if binding to one of the addresses fails.
    pub fn listen(self) -> Result<Server<H>> {
        if self.addrs.is_empty() {
            return Err(Error::NoAddress);
        }

        // Bind listeners and register them with the poller, using their
        // index as token, so connection tokens start right after them
        let events = Poller::new(1024)?;
        let mut acceptors = Vec::with_capacity(self.addrs.len());
        for (n, addr) in self.addrs.into_iter().enumerate() {
            let mut listener = TcpListener::bind(addr)?;
            events.register(&mut listener, Token(n), Interest::READABLE)?;
            info!(addr = %listener.local_addr()?, "listening");
            acceptors.push(listener);
        }

        // Return server
        Ok(Server {
            handler: self.handler,
            events,
            acceptors,
            connections: Slab::new(),
            timeout: self.timeout,
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::NotFound;

    #[test]
    fn test_timeout() {
        let test_cases = vec![
            (Duration::ZERO, Duration::from_millis(1)),
            (Duration::from_millis(250), Duration::from_millis(250)),
        ];
        for (timeout, expected) in test_cases {
            let builder = Builder::new(NotFound).timeout(timeout);
            assert_eq!(builder.timeout, expected, "Failed for {timeout:?}");
        }
    }
}
