//! Bound Unix datagram socket standing in for a GELF collector.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::socket::UnixDatagramTransport;

const RECV_BUFFER: usize = 65_536;

/// Listener bound inside a private temporary directory.
///
/// The socket is non-blocking; local datagram sends complete synchronously,
/// so everything a client flushed is readable straight away.
#[derive(Debug)]
pub struct DatagramCollector {
    socket: UnixDatagram,
    path: PathBuf,
    _dir: TempDir,
}

impl DatagramCollector {
    pub fn bind() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("gelf.sock");
        let socket = UnixDatagram::bind(&path)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            path,
            _dir: dir,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transport(&self) -> UnixDatagramTransport {
        UnixDatagramTransport::new(&self.path)
    }

    /// Next datagram, or `None` when nothing is waiting.
    pub fn recv(&self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; RECV_BUFFER];
        match self.socket.recv(&mut buf) {
            Ok(len) => {
                buf.truncate(len);
                Ok(Some(buf))
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Every waiting datagram decoded as JSON, in arrival order.
    pub fn drain_json(&self) -> io::Result<Vec<serde_json::Value>> {
        let mut messages = Vec::new();
        while let Some(payload) = self.recv()? {
            let value = serde_json::from_slice(&payload)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            messages.push(value);
        }
        Ok(messages)
    }
}
