//! Error taxonomy shared by the encoder and the delivery loop.
//!
//! Encoding and size failures always surface to the caller of
//! [`GelfSocket::log`](crate::GelfSocket::log). Transport failures are
//! returned from strict flushes and diverted to the diagnostic sink for quiet
//! flushes and autoflush.

use std::io;

use thiserror::Error;

/// Errors produced while building or delivering a GELF message.
#[derive(Debug, Error)]
pub enum GelfError {
    /// Opening or connecting the transport failed.
    #[error("failed to connect to {endpoint}: {source}")]
    TransportOpen {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The transport reported an error while sending a datagram.
    #[error("failed to send datagram: {0}")]
    TransportSend(#[source] io::Error),
    /// The transport accepted fewer bytes than the payload holds.
    #[error("only {sent} of {length} bytes sent")]
    PartialSend { sent: usize, length: usize },
    /// The envelope could not be serialised to JSON.
    #[error("failed to encode message: {0}")]
    Encoding(#[from] serde_json::Error),
    /// The encoded message exceeds the maximum datagram size.
    #[error("log message too large: {length} bytes exceeds max length of {max} bytes")]
    Oversize { length: usize, max: usize },
}

impl GelfError {
    /// Return `true` for failures raised by the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::TransportOpen { .. } | Self::TransportSend(_) | Self::PartialSend { .. }
        )
    }
}
