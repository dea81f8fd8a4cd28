//! Transport primitives for datagram delivery.
//!
//! The outbound queue only needs to connect to a local endpoint and send one
//! datagram at a time. [`Transport`] and [`Connection`] capture exactly that,
//! and [`UnixDatagramTransport`] implements them over a Unix domain socket.

use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::net::UnixDatagram;

/// Factory for connections to a single endpoint.
pub trait Transport {
    type Connection: Connection;

    /// Open and connect a new connection.
    fn connect(&self) -> io::Result<Self::Connection>;

    /// Human-readable endpoint description used in diagnostics.
    fn describe(&self) -> String;
}

/// A live connection able to send whole datagrams.
pub trait Connection {
    /// Send `payload` as one datagram, returning the number of bytes sent.
    fn send(&mut self, payload: &[u8]) -> io::Result<usize>;

    /// Release the connection.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Unix datagram socket addressed by filesystem path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnixDatagramTransport {
    path: PathBuf,
}

impl UnixDatagramTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Active datagram socket.
#[derive(Debug)]
pub enum DatagramConnection {
    #[cfg(unix)]
    Unix(UnixDatagram),
}

impl Transport for UnixDatagramTransport {
    type Connection = DatagramConnection;

    fn connect(&self) -> io::Result<DatagramConnection> {
        #[cfg(unix)]
        {
            let socket = UnixDatagram::unbound()?;
            socket.connect(&self.path)?;
            Ok(DatagramConnection::Unix(socket))
        }
        #[cfg(not(unix))]
        {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "unix domain sockets are not supported on this platform",
            ))
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl Connection for DatagramConnection {
    fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        match *self {
            #[cfg(unix)]
            DatagramConnection::Unix(ref socket) => socket.send(payload),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match *self {
            #[cfg(unix)]
            DatagramConnection::Unix(ref socket) => socket.shutdown(std::net::Shutdown::Both),
        }
    }
}
