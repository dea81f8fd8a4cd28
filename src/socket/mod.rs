//! Datagram delivery of encoded GELF messages.
//!
//! [`serialise`] turns an envelope into a size-checked JSON payload,
//! [`Outbound`] queues payloads and drains them over a lazily opened
//! connection, and [`transport`] abstracts the socket so tests can script
//! connect and send results.

mod outbound;
pub mod serialise;
mod transport;


pub use outbound::{ConnectionState, Outbound};
pub use serialise::{MAX_MESSAGE_SIZE, encode, encode_with_limit};
pub use transport::{Connection, DatagramConnection, Transport, UnixDatagramTransport};
