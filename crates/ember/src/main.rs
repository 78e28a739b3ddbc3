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

//! Command line interface.

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ember_codec::{decode, decoded_len, encode, encoded_len, get_cookie};
use ember_serve::server;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Percent-encoding, cookies, and a small static file server.
#[derive(Debug, Parser)]
#[command(name = "ember", version, about)]
struct Args {
    /// Command to run.
    #[command(subcommand)]
    command: Command,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Command.
#[derive(Debug, Subcommand)]
enum Command {
    /// Serve static files until terminated.
    Serve {
        /// Server option, e.g. `-o listening_ports=8080`.
        #[arg(short, long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,
    },
    /// Percent-encode text.
    Encode {
        /// Text to encode.
        text: String,
    },
    /// Percent-decode text.
    Decode {
        /// Decode `+` as space, as in form data.
        #[arg(long)]
        form: bool,
        /// Text to decode.
        text: String,
    },
    /// Look up a cookie value in a `Cookie` header.
    Cookie {
        /// Header value, e.g. `a=1; b=2`.
        header: String,
        /// Cookie name.
        name: String,
    },
}

// ----------------------------------------------------------------------------
// Program
// ----------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Dispatch command
    match Args::parse().command {
        Command::Serve { options } => {
            let ctx = server::start(options)
                .context("failed to start server")?;
            for addr in ctx.local_addrs() {
                info!(%addr, "serving");
            }
            ctx.wait().context("server terminated")?;
        }
        Command::Encode { text } => {
            let mut buf = vec![0; encoded_len(text.as_bytes()) + 1];
            let written = encode(text.as_bytes(), &mut buf)?;
            println!("{}", String::from_utf8_lossy(&written));
        }
        Command::Decode { form, text } => {
            let mut buf = vec![0; decoded_len(text.as_bytes(), form) + 1];
            let written = decode(text.as_bytes(), &mut buf, form)?;
            println!("{}", String::from_utf8_lossy(&written));
        }
        Command::Cookie { header, name } => {
            let mut buf = vec![0; header.len() + 1];
            match get_cookie(&header, &name, &mut buf) {
                Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
                Err(err) => bail!("{name}: {err} (status {})", err.code()),
            }
        }
    }

    // No errors occurred
    Ok(())
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Parses a `name=value` server option.
fn parse_option(value: &str) -> Result<(String, String)> {
    match value.split_once('=') {
        Some((name, value)) if !name.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => bail!("expected name=value, got '{value}'"),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("listening_ports=8080,8443s").unwrap(),
            ("listening_ports".to_string(), "8080,8443s".to_string())
        );
        assert_eq!(
            parse_option("document_root=").unwrap(),
            ("document_root".to_string(), String::new())
        );
        assert!(parse_option("document_root").is_err());
        assert!(parse_option("=value").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "ember", "serve", "-o", "document_root=.", "--option",
            "listening_ports=0",
        ])
        .unwrap();
        let Command::Serve { options } = args.command else {
            panic!("expected serve command");
        };
        assert_eq!(options.len(), 2);

        let args =
            Args::try_parse_from(["ember", "decode", "--form", "a+b"]).unwrap();
        assert!(matches!(args.command, Command::Decode { form: true, .. }));
    }
}
