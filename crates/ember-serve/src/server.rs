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

//! HTTP server.

use mio::net::TcpListener;
use mio::{Interest, Token, Waker};
use slab::Slab;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::handler::Handler;

mod builder;
mod connection;
mod context;
mod error;
pub mod options;
mod poller;

pub use builder::Builder;
use connection::{Connection, Signal};
pub use context::{start, Context};
pub use error::{Error, Result};
pub use options::{Options, Port};
use poller::{Poller, WAKER};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP server.
///
/// The server runs on the calling thread, multiplexing all listeners and
/// connections over a single poller. It's driven by calling [`Server::poll`]
/// in a loop, which can be interrupted from other threads with the waker.
/// Most of the time, [`start`] is the better choice, as it runs the server
/// on a dedicated thread and takes care of stopping it.
pub struct Server<H>
where
    H: Handler,
{
    /// Handler for incoming requests.
    handler: H,
    /// Poller for I/O events.
    events: Poller,
    /// Acceptors for incoming connections.
    acceptors: Vec<TcpListener>,
    /// HTTP connections.
    connections: Slab<Connection>,
    /// Idle timeout of connections.
    timeout: Duration,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<H> Server<H>
where
    H: Handler,
{
    /// Creates a server builder.
    #[inline]
    pub fn builder(handler: H) -> Builder<H> {
        Builder::new(handler)
    }

    /// Polls the server for events and processes them.
    ///
    /// This blocks for at most a second, so idle connections are dropped in
    /// time, and returns early when the waker is triggered.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Io`] if polling or registering sockets
    /// with the poller fails. Errors on single connections are not reported,
    /// they just close the connection.
    pub fn poll(&mut self) -> Result {
        let timeout = self.timeout.min(Duration::from_secs(1));
        self.events.poll(Some(timeout))?;

        // Drop timed out connections
        let now = Instant::now();
        let timed_out: Vec<_> = self
            .connections
            .iter()
            .filter(|(_, conn)| conn.is_timed_out(now, self.timeout))
            .map(|(n, _)| n)
            .collect();
        for n in timed_out {
            debug!(connection = n, "timed out");
            self.close(n)?;
        }

        // Handle events
        let start = self.acceptors.len();
        for event in &self.events {
            let token = event.token();
            if token == WAKER {
                continue;
            }

            // Accept all pending connections on a listener
            let n: usize = token.into();
            if let Some(acceptor) = self.acceptors.get(n) {
                loop {
                    match acceptor.accept() {
                        Ok((socket, _)) => {
                            let entry = self.connections.vacant_entry();
                            let token = Token(start + entry.key());
                            let conn = entry.insert(Connection::new(socket));
                            self.events.register(
                                conn.socket(),
                                token,
                                Interest::READABLE,
                            )?;
                        }
                        Err(err) if err.kind() == ErrorKind::WouldBlock => {
                            break;
                        }
                        Err(err) => {
                            warn!(%err, "accept failed");
                            break;
                        }
                    }
                }
                continue;
            }

            // Read from or write to the connection, which might already have
            // been closed due to a timeout in this iteration
            let key = n - start;
            let Some(conn) = self.connections.get_mut(key) else {
                continue;
            };
            let mut signal = Signal::Continue;
            if event.is_readable() {
                signal = conn.read(&self.handler);
            }
            if signal != Signal::Close && conn.is_writing() {
                signal = conn.write(&self.handler);
            }

            // Process signal
            match signal {
                Signal::Interest(interest) => {
                    self.events.reregister(conn.socket(), token, interest)?;
                }
                Signal::Close => {
                    let conn = self.connections.remove(key);
                    self.events.deregister(&mut conn.into_socket())?;
                }
                Signal::Continue => {}
            }
        }

        // No errors occurred
        Ok(())
    }

    /// Returns the addresses the server is listening on.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Io`] if the address of a listener can't
    /// be determined.
    pub fn local_addrs(&self) -> Result<Vec<SocketAddr>> {
        self.acceptors
            .iter()
            .map(|acceptor| acceptor.local_addr().map_err(Into::into))
            .collect()
    }

    /// Returns the waker for interrupting [`Server::poll`].
    #[inline]
    pub fn waker(&self) -> Arc<Waker> {
        self.events.waker()
    }

    /// Closes the connection and deregisters it from the poller.
    fn close(&mut self, key: usize) -> Result {
        if let Some(conn) = self.connections.try_remove(key) {
            let mut socket = conn.into_socket();
            self.events.deregister(&mut socket)?;
        }
        Ok(())
    }
}
