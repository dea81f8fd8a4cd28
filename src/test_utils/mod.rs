//! Test helpers shared by unit tests, integration tests, and downstream
//! crates enabling the `test-util` feature.

#[cfg(unix)]
mod datagram_collector;
mod scripted_transport;

#[cfg(unix)]
pub use datagram_collector::DatagramCollector;
pub use scripted_transport::{ScriptedConnection, ScriptedTransport, SendOutcome};
