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

//! HTTP server options.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Default port.
const DEFAULT_PORT: u16 = 8080;

/// Default idle timeout of connections.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP server options.
///
/// Options are given as a list of name-value pairs, which makes them easy to
/// pass through from the command line. The following names are known:
///
/// - `document_root`: directory to serve static files from.
/// - `listening_ports`: comma-separated list of `[host:]port[s]` entries.
/// - `ssl_certificate`: certificate required by ports with an `s` suffix.
/// - `request_timeout_ms`: idle timeout of connections in milliseconds,
///   which must be greater than zero.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use ember_serve::server::Options;
///
/// // Create options from pairs
/// let options = Options::from_pairs([
///     ("document_root", "."),
///     ("listening_ports", "127.0.0.1:8080,8443s"),
///     ("ssl_certificate", "cert.pem"),
/// ])?;
/// assert_eq!(options.ports.len(), 2);
/// assert!(options.ports[1].secure);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Document root, if static files should be served.
    pub document_root: Option<PathBuf>,
    /// Ports to listen on.
    pub ports: Vec<Port>,
    /// Certificate for secure ports.
    pub ssl_certificate: Option<PathBuf>,
    /// Idle timeout of connections.
    pub request_timeout: Duration,
}

/// Listening port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Port {
    /// Socket address.
    pub addr: SocketAddr,
    /// Whether the port expects TLS.
    pub secure: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Options {
    /// Creates options from name-value pairs.
    ///
    /// Later values override earlier ones. All options not given keep their
    /// defaults, i.e., listening on port 8080 of all interfaces with a
    /// timeout of 30 seconds and no document root.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::UnknownOption`] for unknown names,
    /// [`Error::InvalidPort`] and [`Error::InvalidValue`] for values that
    /// can't be parsed, and [`Error::MissingCertificate`] if a secure port
    /// is configured without a certificate.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Options::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "document_root" => {
                    options.document_root = Some(PathBuf::from(value));
                }
                "listening_ports" => {
                    options.ports = value
                        .split(',')
                        .map(str::trim_ascii)
                        .filter(|port| !port.is_empty())
                        .map(Port::from_str)
                        .collect::<Result<_>>()?;
                }
                "ssl_certificate" => {
                    options.ssl_certificate = Some(PathBuf::from(value));
                }
                "request_timeout_ms" => {
                    let ms = value
                        .trim_ascii()
                        .parse::<u64>()
                        .ok()
                        .filter(|ms| *ms > 0)
                        .ok_or_else(|| Error::InvalidValue {
                            name: name.to_string(),
                            value: value.to_string(),
                        })?;
                    options.request_timeout = Duration::from_millis(ms);
                }
                _ => return Err(Error::UnknownOption(name.to_string())),
            }
        }

        // Secure ports can't work without a certificate
        let secure = options.ports.iter().any(|port| port.secure);
        if secure && options.ssl_certificate.is_none() {
            return Err(Error::MissingCertificate);
        }

        // No errors occurred
        Ok(options)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Options {
    fn default() -> Self {
        Self {
            document_root: None,
            ports: vec![Port {
                addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
                secure: false,
            }],
            ssl_certificate: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ----------------------------------------------------------------------------

impl FromStr for Port {
    type Err = Error;

    /// Parses a `[host:]port[s]` entry.
    ///
    /// A bare port binds all IPv4 interfaces. Hosts must be IP addresses, so
    /// IPv6 addresses need brackets, e.g. `[::1]:8080`.
    fn from_str(value: &str) -> Result<Self> {
        let (addr, secure) = match value.strip_suffix('s') {
            Some(addr) => (addr, true),
            None => (value, false),
        };

        // Try bare port first, then full socket address
        let addr = addr
            .parse::<u16>()
            .map(|port| SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .or_else(|_| addr.parse::<SocketAddr>())
            .map_err(|_| Error::InvalidPort(value.to_string()))?;

        // Return port
        Ok(Port { addr, secure })
    }
}

impl fmt::Display for Port {
    /// Formats the port in the format it was parsed from.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)?;
        if self.secure {
            f.write_str("s")?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_from_str() {
        let test_cases = vec![
            ("8080", "0.0.0.0:8080", false),
            ("8443s", "0.0.0.0:8443", true),
            ("0", "0.0.0.0:0", false),
            ("127.0.0.1:8080", "127.0.0.1:8080", false),
            ("[::1]:8443s", "[::1]:8443", true),
        ];

        for (value, addr, secure) in test_cases {
            let port: Port = value.parse().unwrap();
            assert_eq!(port.addr.to_string(), addr, "Failed for '{value}'");
            assert_eq!(port.secure, secure, "Failed for '{value}'");
        }
    }

    #[test]
    fn test_port_from_str_invalid() {
        for value in ["", "s", "http", "65536", "localhost:80", "80ss"] {
            assert_eq!(
                value.parse::<Port>(),
                Err(Error::InvalidPort(value.to_string())),
                "Failed for '{value}'"
            );
        }
    }

    #[test]
    fn test_from_pairs() {
        let options = Options::from_pairs([
            ("document_root", "."),
            ("listening_ports", "8080, 127.0.0.1:0"),
            ("request_timeout_ms", "250"),
        ])
        .unwrap();
        assert_eq!(options.document_root, Some(PathBuf::from(".")));
        assert_eq!(options.ports.len(), 2);
        assert_eq!(options.ports[1].to_string(), "127.0.0.1:0");
        assert_eq!(options.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_from_pairs_defaults() {
        let options = Options::from_pairs::<_, &str, &str>([]).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.ports[0].to_string(), "0.0.0.0:8080");
        assert_eq!(options.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_pairs_overrides() {
        let options = Options::from_pairs([
            ("listening_ports", "1,2,3"),
            ("listening_ports", "4"),
        ])
        .unwrap();
        assert_eq!(options.ports.len(), 1);
        assert_eq!(options.ports[0].addr.port(), 4);
    }

    #[test]
    fn test_from_pairs_errors() {
        let test_cases = vec![
            (("num_threads", "4"), Error::UnknownOption("num_threads".into())),
            (("listening_ports", "80,x"), Error::InvalidPort("x".into())),
            (("listening_ports", "8443s"), Error::MissingCertificate),
            (
                ("request_timeout_ms", "soon"),
                Error::InvalidValue {
                    name: "request_timeout_ms".into(),
                    value: "soon".into(),
                },
            ),
            (
                ("request_timeout_ms", "0"),
                Error::InvalidValue {
                    name: "request_timeout_ms".into(),
                    value: "0".into(),
                },
            ),
        ];

        for (pair, expected) in test_cases {
            assert_eq!(
                Options::from_pairs([pair]),
                Err(expected),
                "Failed for {pair:?}"
            );
        }
    }
}
