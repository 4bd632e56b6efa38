//! Wrapper over `std::net::TcpStream` with socket options matching the
//! teacher's `BindAndConnect` (`TCP_NODELAY`, `SO_KEEPALIVE`), minus the
//! non-blocking/CPU-affinity machinery that only the mio reactor needs.

use crate::stream::ConnectionInfo;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::io::{Read, Write};
use std::net::ToSocketAddrs;

pub struct TcpStream {
    inner: std::net::TcpStream,
}

impl TcpStream {
    /// Resolves `info` and connects to the first address the OS returns.
    pub fn connect(info: &ConnectionInfo) -> io::Result<Self> {
        let addr = info
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::other("unable to resolve socket address"))?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nodelay(true)?;
        socket.set_keepalive(true)?;
        socket.connect(&addr.into())?;

        Ok(Self { inner: socket.into() })
    }

    pub fn close(&mut self) -> io::Result<()> {
        // Idempotent: a second shutdown on an already-shut-down socket is a
        // harmless `ENOTCONN`.
        let _ = self.inner.shutdown(std::net::Shutdown::Both);
        Ok(())
    }
}

impl Read for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for TcpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
