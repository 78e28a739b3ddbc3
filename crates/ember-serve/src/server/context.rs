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

//! HTTP server context.

use crossbeam::channel::{bounded, Sender};
use mio::Waker;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

use crate::handler::Stack;
use crate::middleware::{AccessLog, StaticFiles};

use super::options::Options;
use super::{Error, Result, Server};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP server context.
///
/// The context is the handle of a server running on a dedicated thread, which
/// is returned by [`start`] once all listeners are bound. Dropping the context
/// stops the server, so it must be kept alive for as long as the server should
/// be running.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_serve::server::start;
///
/// // Start server on an ephemeral port
/// let ctx = start([
///     ("document_root", "."),
///     ("listening_ports", "127.0.0.1:0"),
/// ])?;
/// assert_ne!(ctx.local_addrs()[0].port(), 0);
///
/// // Stop server
/// ctx.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Context {
    /// Addresses the server is listening on.
    addrs: Vec<SocketAddr>,
    /// Flag to signal the server to stop.
    stop: Arc<AtomicBool>,
    /// Waker to interrupt polling.
    waker: Arc<Waker>,
    /// Server thread, until joined.
    thread: Option<JoinHandle<Result>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Context {
    /// Starts a server with the given options.
    ///
    /// The server is set up on its own thread, which reports back whether all
    /// listeners could be bound, so errors surface here, not later.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::TlsUnsupported`] if a secure port is
    /// configured, [`Error::NoAddress`] if there's no port at all, and
    /// [`Error::Io`] if the document root doesn't exist or binding fails.
    pub fn start(options: Options) -> Result<Self> {
        if options.ports.iter().any(|port| port.secure) {
            return Err(Error::TlsUnsupported);
        }

        // Spawn server thread and wait for it to report back
        let (sender, receiver) = bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        let thread = thread::Builder::new().name("ember-serve".into()).spawn({
            let stop = Arc::clone(&stop);
            move || run(&options, &stop, &sender)
        })?;

        // The thread only hangs up without reporting if it panicked
        match receiver.recv() {
            Ok(Ok((waker, addrs))) => Ok(Self {
                addrs,
                stop,
                waker,
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => Err(Error::Disconnected),
        }
    }

    /// Returns the addresses the server is listening on.
    ///
    /// Ephemeral ports are resolved, so this returns the actual ports.
    #[must_use]
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    /// Stops the server and waits for its thread to finish.
    ///
    /// # Errors
    ///
    /// This method returns the error that terminated the server, if any, and
    /// [`Error::Disconnected`] if the server thread panicked.
    pub fn stop(mut self) -> Result {
        self.shutdown()
    }

    /// Waits for the server to finish, without stopping it.
    ///
    /// # Errors
    ///
    /// This method returns the error that terminated the server, if any, and
    /// [`Error::Disconnected`] if the server thread panicked.
    pub fn wait(mut self) -> Result {
        self.join()
    }

    /// Signals the server to stop and joins its thread.
    fn shutdown(&mut self) -> Result {
        if self.thread.is_some() {
            self.stop.store(true, Ordering::Release);
            self.waker.wake()?;
        }
        self.join()
    }

    /// Joins the server thread, if not already joined.
    fn join(&mut self) -> Result {
        match self.thread.take() {
            Some(thread) => thread.join().unwrap_or(Err(Error::Disconnected)),
            None => Ok(()),
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Drop for Context {
    /// Stops the server, if still running.
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(%err, "server terminated with error");
        }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Starts a server with the given option pairs.
///
/// This is a shorthand for parsing [`Options`] with [`Options::from_pairs`]
/// and passing them to [`Context::start`].
///
/// # Errors
///
/// This method returns [`Error::Option`] if the options are invalid, and all
/// errors of [`Context::start`].
pub fn start<I, K, V>(pairs: I) -> Result<Context>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Context::start(Options::from_pairs(pairs)?)
}

/// Sets up the server, reports the outcome, and polls until stopped.
fn run(
    options: &Options, stop: &AtomicBool,
    sender: &Sender<Result<(Arc<Waker>, Vec<SocketAddr>)>>,
) -> Result {
    let server = setup(options).and_then(|server| {
        let addrs = server.local_addrs()?;
        Ok((server, addrs))
    });
    let mut server = match server {
        Ok((server, addrs)) => {
            let _ = sender.send(Ok((server.waker(), addrs)));
            server
        }
        Err(err) => {
            let _ = sender.send(Err(err));
            return Ok(());
        }
    };

    // Poll until stopped
    info!("server started");
    while !stop.load(Ordering::Acquire) {
        server.poll()?;
    }
    info!("server stopped");
    Ok(())
}

/// Creates the handler stack and server from the given options.
fn setup(options: &Options) -> Result<Server<Stack>> {
    let mut stack = Stack::new().with(AccessLog);
    if let Some(root) = &options.document_root {
        stack = stack.with(StaticFiles::new(root)?);
    }

    // Bind all ports
    let mut builder = Server::builder(stack).timeout(options.request_timeout);
    for port in &options.ports {
        builder = builder.bind(port.addr)?;
    }
    builder.listen()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};

    use super::*;
    use crate::server::options;

    /// Sends a raw request and returns the raw response.
    fn request(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();
        let mut res = String::new();
        stream.read_to_string(&mut res).unwrap();
        res
    }

    #[test]
    fn test_start_stop() {
        let ctx = start([("listening_ports", "127.0.0.1:0")]).unwrap();
        assert_eq!(ctx.local_addrs().len(), 1);
        ctx.stop().unwrap();
    }

    #[test]
    fn test_serve_document_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "hello").unwrap();
        let root = dir.path().to_str().unwrap();
        let ctx = start([
            ("document_root", root),
            ("listening_ports", "127.0.0.1:0"),
        ])
        .unwrap();

        let addr = ctx.local_addrs()[0];
        let raw = "GET / HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n";
        let res = request(addr, raw);
        assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
        assert!(res.contains("Connection: close\r\n"), "{res}");
        assert!(res.ends_with("\r\n\r\nhello"), "{res}");

        let res = request(addr, "GET /missing HTTP/1.1\r\n\r\n");
        assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");

        let res = request(addr, "GET /../etc HTTP/1.1\r\n\r\n");
        assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{res}");
        ctx.stop().unwrap();
    }

    #[test]
    fn test_keep_alive() {
        let ctx = start([("listening_ports", "127.0.0.1:0")]).unwrap();
        let mut stream = TcpStream::connect(ctx.local_addrs()[0]).unwrap();

        let mut buf = [0u8; 1024];
        for _ in 0..2 {
            stream.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
            let n = stream.read(&mut buf).unwrap();
            let res = String::from_utf8_lossy(&buf[..n]);
            assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");
            assert!(!res.contains("Connection: close"), "{res}");
        }
        drop(ctx);
    }

    #[test]
    fn test_pipelining() {
        let ctx = start([("listening_ports", "127.0.0.1:0")]).unwrap();
        let addr = ctx.local_addrs()[0];

        // Answer buffered requests in order
        let raw = "GET /a HTTP/1.1\r\n\r\n\
            POST /b HTTP/1.1\r\nContent-Length: 3\r\n\r\nxyz\
            GET /c HTTP/1.1\r\n\r\n";
        let res = request(addr, raw);
        let count = res.matches("HTTP/1.1 404 Not Found\r\n").count();
        assert_eq!(count, 3, "{res}");

        // Answer buffered requests without waiting for more data
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(
                b"GET /a HTTP/1.1\r\n\r\n\
                GET /b HTTP/1.1\r\nConnection: close\r\n\r\n",
            )
            .unwrap();
        let mut res = String::new();
        stream.read_to_string(&mut res).unwrap();
        let count = res.matches("HTTP/1.1 404 Not Found\r\n").count();
        assert_eq!(count, 2, "{res}");
        ctx.stop().unwrap();
    }

    #[test]
    fn test_start_errors() {
        let res = start([("listening_ports", "8443s")]);
        assert!(matches!(
            res,
            Err(Error::Option(options::Error::MissingCertificate))
        ));

        let res = start([
            ("listening_ports", "127.0.0.1:0,127.0.0.1:0s"),
            ("ssl_certificate", "cert.pem"),
        ]);
        assert!(matches!(res, Err(Error::TlsUnsupported)));

        let res = start([("listening_ports", "")]);
        assert!(matches!(res, Err(Error::NoAddress)));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let res = start([
            ("document_root", missing.to_str().unwrap()),
            ("listening_ports", "127.0.0.1:0"),
        ]);
        assert!(matches!(res, Err(Error::Io(_))));
    }

    #[test]
    fn test_start_addr_in_use() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let res = start([("listening_ports", addr.as_str())]);
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
