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

//! HTTP connection.

use httpdate::fmt_http_date;
use mio::net::TcpStream;
use mio::Interest;
use std::io::{self, Cursor, ErrorKind, Read, Write};
use std::mem;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

use crate::handler::Handler;
use crate::http::request::{Error, MAX_REQUEST_SIZE};
use crate::http::response::ResponseExt;
use crate::http::{Header, Request, Response};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Connection action after handling an event.
#[derive(Debug, PartialEq, Eq)]
pub enum Signal {
    /// Continue with the specified interest.
    Interest(Interest),
    /// Continue without changing the current interest.
    Continue,
    /// Connection was closed.
    Close,
}

// ----------------------------------------------------------------------------

/// Internal buffer state.
#[derive(Debug)]
enum Buffer {
    /// Currently reading a request.
    Reading(Vec<u8>),
    /// Currently writing a response, closing the connection afterwards if
    /// the flag is set, and keeping pipelined bytes for the next request.
    Writing(Cursor<Vec<u8>>, bool, Vec<u8>),
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP connection.
///
/// Connections alternate between reading a request and writing the response,
/// and are kept alive, unless the client asks to close it, or the request
/// couldn't be parsed, in which case the rest of the stream is unreliable.
/// Pipelined requests are answered in order.
#[derive(Debug)]
pub struct Connection {
    /// TCP socket.
    socket: TcpStream,
    /// Read/write buffer.
    buffer: Buffer,
    /// Last activity time.
    time: Instant,
    /// Whether the client shut down its writing half.
    eof: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Connection {
    /// Creates a connection.
    pub fn new(socket: TcpStream) -> Self {
        Connection {
            socket,
            buffer: Buffer::Reading(Vec::new()),
            time: Instant::now(),
            eof: false,
        }
    }

    /// Consumes the connection and returns the underlying socket.
    pub fn into_socket(self) -> TcpStream {
        self.socket
    }

    /// Returns a mutable reference to the underlying socket.
    pub fn socket(&mut self) -> &mut TcpStream {
        &mut self.socket
    }

    /// Reads from the socket and handles the request, once it's complete.
    ///
    /// The socket is drained until it would block, as readiness events are
    /// edge-triggered, or until the buffer exceeds the request size limit.
    /// A client that shuts down its writing half after the request still
    /// gets its response.
    pub fn read<H>(&mut self, handler: &H) -> Signal
    where
        H: Handler,
    {
        let Buffer::Reading(buffer) = &mut self.buffer else {
            return Signal::Continue;
        };

        // Read all available data, but never more than a request may take
        self.time = Instant::now();
        let mut temp = [0u8; 4096];
        while buffer.len() <= MAX_REQUEST_SIZE {
            match self.socket.read(&mut temp) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(bytes) => buffer.extend_from_slice(&temp[..bytes]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    report(&err);
                    return Signal::Close;
                }
            }
        }
        self.handle(handler)
    }

    /// Writes the pending response to the socket.
    ///
    /// Once the response is written, pipelined requests that are already
    /// buffered are handled right away, since no readiness event is emitted
    /// for bytes that were already read from the socket.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write<H>(&mut self, handler: &H) -> Signal
    where
        H: Handler,
    {
        self.time = Instant::now();
        loop {
            let Buffer::Writing(cursor, close, rest) = &mut self.buffer else {
                return Signal::Continue;
            };

            // Write until done, or until the socket would block
            loop {
                let pos = cursor.position() as usize;
                let data = &cursor.get_ref()[pos..];
                if data.is_empty() {
                    break;
                }
                match self.socket.write(data) {
                    Ok(0) => return Signal::Close,
                    Ok(bytes) => cursor.set_position((pos + bytes) as u64),
                    Err(err) if err.kind() == ErrorKind::WouldBlock => {
                        return Signal::Interest(Interest::WRITABLE);
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(err) => {
                        report(&err);
                        return Signal::Close;
                    }
                }
            }

            // Response is written, so either close, or go on with the next
            if *close {
                return Signal::Close;
            }
            let rest = mem::take(rest);
            let pending = !rest.is_empty();
            self.buffer = Buffer::Reading(rest);
            if !pending {
                return Signal::Interest(Interest::READABLE);
            }
            match self.handle(handler) {
                Signal::Interest(Interest::WRITABLE) => {}
                Signal::Continue => return Signal::Interest(Interest::READABLE),
                signal => return signal,
            }
        }
    }

    /// Returns whether the connection is currently writing data.
    pub fn is_writing(&self) -> bool {
        matches!(self.buffer, Buffer::Writing(..))
    }

    /// Returns whether the connection was idle for longer than the timeout.
    pub fn is_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.time) > timeout
    }

    /// Parses and handles the buffered request, or keeps on reading if it's
    /// incomplete. Bytes after the request are kept for the next one.
    fn handle<H>(&mut self, handler: &H) -> Signal
    where
        H: Handler,
    {
        let Buffer::Reading(buffer) = &mut self.buffer else {
            return Signal::Continue;
        };
        let (res, close, rest) = match Request::parse(buffer) {
            Ok((req, n)) => {
                let close = req.headers.wants_close()
                    || (self.eof && n == buffer.len());
                let res = handler.handle(req);
                (res, close, buffer.split_off(n))
            }
            Err(Error::Incomplete) if self.eof => return Signal::Close,
            Err(Error::Incomplete) => return Signal::Continue,
            Err(err) => {
                debug!(%err, "invalid request");
                (Response::from_status(err.status()), true, Vec::new())
            }
        };

        // Add general headers and switch to writing
        let mut res = res
            .header(Header::Date, fmt_http_date(SystemTime::now()))
            .header(Header::Server, "ember");
        if close {
            res = res.header(Header::Connection, "close");
        }
        let cursor = Cursor::new(res.into_bytes());
        self.buffer = Buffer::Writing(cursor, close, rest);
        Signal::Interest(Interest::WRITABLE)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Reports a socket error, unless it's the client going away.
fn report(err: &io::Error) {
    match err.kind() {
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::UnexpectedEof => debug!(%err, "connection lost"),
        _ => warn!(%err, "socket error"),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::net;
    use std::thread;

    use super::*;
    use crate::handler::NotFound;

    #[test]
    fn test_read_limit() {
        let listener = net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = net::TcpStream::connect(addr).unwrap();
            let mut bytes = b"GET / HTTP/1.1\r\nHost: ".to_vec();
            bytes.resize(MAX_REQUEST_SIZE + 1, b'a');
            stream.write_all(&bytes).unwrap();
            let mut res = String::new();
            stream.read_to_string(&mut res).unwrap();
            res
        });

        // Stop reading once the limit is exceeded
        let (socket, _) = listener.accept().unwrap();
        socket.set_nonblocking(true).unwrap();
        let mut conn = Connection::new(TcpStream::from_std(socket));
        let signal = loop {
            match conn.read(&NotFound) {
                Signal::Continue => thread::sleep(Duration::from_millis(10)),
                signal => break signal,
            }
        };
        assert_eq!(signal, Signal::Interest(Interest::WRITABLE));

        // Respond and close
        let signal = loop {
            match conn.write(&NotFound) {
                Signal::Interest(Interest::WRITABLE) => {
                    thread::sleep(Duration::from_millis(10));
                }
                signal => break signal,
            }
        };
        assert_eq!(signal, Signal::Close);
        drop(conn);

        let res = client.join().unwrap();
        assert!(res.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{res}");
        assert!(res.contains("Connection: close\r\n"), "{res}");
    }
}
