//! Transport: open a TCP socket, optionally negotiate TLS, and expose the
//! result as a byte-duplex [`Conn`] with a `close` operation.
//!
//! Adapted from `boomnet::stream`, which targets a non-blocking `mio` reactor;
//! here the duplex performs ordinary blocking I/O, the simplest faithful
//! match for a pooled, one-request-at-a-time connection.

pub mod tcp;
#[cfg(feature = "rustls")]
pub mod tls;

use std::fmt::{Display, Formatter};
use std::io::{self, Read, Write};
use std::net::ToSocketAddrs;

use crate::request::CertCheck;

/// Host/port pair identifying a remote endpoint, independent of scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionInfo {
    host: String,
    port: u16,
}

impl ConnectionInfo {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl ToSocketAddrs for ConnectionInfo {
    type Iter = std::vec::IntoIter<std::net::SocketAddr>;

    fn to_socket_addrs(&self) -> io::Result<Self::Iter> {
        format!("{}:{}", self.host, self.port).to_socket_addrs()
    }
}

impl Display for ConnectionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A connected duplex: either plaintext TCP or TLS-over-TCP. At most one
/// borrower owns a given instance at a time (see [`crate::pool::Manager`]).
pub enum Conn {
    Plain(tcp::TcpStream),
    #[cfg(feature = "rustls")]
    Tls(Box<tls::TlsStream>),
}

impl Conn {
    /// Opens a fresh connection to `info`, negotiating TLS when `secure`.
    ///
    /// Address resolution takes the first successful result of the OS
    /// resolver.
    pub fn open(info: &ConnectionInfo, secure: bool, check_certs: &CertCheck) -> io::Result<Conn> {
        let tcp = tcp::TcpStream::connect(info)?;
        if secure {
            #[cfg(feature = "rustls")]
            {
                let tls = tls::TlsStream::wrap(tcp, info.host(), check_certs)?;
                return Ok(Conn::Tls(Box::new(tls)));
            }
            #[cfg(not(feature = "rustls"))]
            {
                let _ = check_certs;
                return Err(io::Error::other(
                    "TLS support not compiled in (enable the `rustls-native` or `rustls-webpki` feature)",
                ));
            }
        }
        Ok(Conn::Plain(tcp))
    }

    /// Idempotently closes both the read and write halves of the underlying
    /// socket. Safe to call more than once.
    pub fn close(&mut self) -> io::Result<()> {
        match self {
            Conn::Plain(tcp) => tcp.close(),
            #[cfg(feature = "rustls")]
            Conn::Tls(tls) => tls.close(),
        }
    }
}

impl Read for Conn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Conn::Plain(tcp) => tcp.read(buf),
            #[cfg(feature = "rustls")]
            Conn::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Conn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Conn::Plain(tcp) => tcp.write(buf),
            #[cfg(feature = "rustls")]
            Conn::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Conn::Plain(tcp) => tcp.flush(),
            #[cfg(feature = "rustls")]
            Conn::Tls(tls) => tls.flush(),
        }
    }
}
