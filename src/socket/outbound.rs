//! Buffered, lazily connecting delivery queue.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crate::error::GelfError;
use crate::rate_limited_warner::RateLimitedWarner;

use super::serialise::MIN_PAYLOAD_SIZE;
use super::transport::{Connection, Transport};

/// Whether the queue currently holds a live connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// FIFO of encoded messages plus the connection used to drain it.
///
/// Messages leave the queue only after a complete send. A partial send or a
/// send error puts the message back at the head so delivery order is kept
/// across flushes.
pub struct Outbound<T: Transport> {
    transport: T,
    queue: VecDeque<Vec<u8>>,
    connection: Option<T::Connection>,
    warner: RateLimitedWarner,
}

impl<T: Transport> Outbound<T> {
    pub fn new(transport: T, warn_interval: Duration) -> Self {
        Self {
            transport,
            queue: VecDeque::new(),
            connection: None,
            warner: RateLimitedWarner::new(warn_interval),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn enqueue(&mut self, payload: Vec<u8>) {
        self.queue.push_back(payload);
    }

    /// Number of messages waiting for delivery.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Try to deliver every queued message.
    ///
    /// With `quiet` set, failures are logged and `Ok` is returned; queued
    /// messages are kept either way.
    pub fn flush(&mut self, quiet: bool) -> Result<(), GelfError> {
        match self.drain() {
            Err(err) if quiet => {
                self.report(&err);
                Ok(())
            }
            other => other,
        }
    }

    fn drain(&mut self) -> Result<(), GelfError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.connect()?,
        };
        while let Some(payload) = self.queue.pop_front() {
            if payload.len() < MIN_PAYLOAD_SIZE {
                log::debug!("discarding empty GELF payload ({} bytes)", payload.len());
                continue;
            }
            match connection.send(&payload) {
                Ok(sent) if sent == payload.len() => {}
                Ok(sent) => {
                    let length = payload.len();
                    self.queue.push_front(payload);
                    self.connection = Some(connection);
                    return Err(GelfError::PartialSend { sent, length });
                }
                Err(err) => {
                    self.queue.push_front(payload);
                    close_connection(connection);
                    return Err(GelfError::TransportSend(err));
                }
            }
        }
        self.connection = Some(connection);
        Ok(())
    }

    fn connect(&self) -> Result<T::Connection, GelfError> {
        let endpoint = self.transport.describe();
        log::debug!("connecting to GELF endpoint {endpoint}");
        self.transport
            .connect()
            .map_err(|source| GelfError::TransportOpen { endpoint, source })
    }

    /// Route a delivery failure to the diagnostic log.
    pub(crate) fn report(&mut self, err: &GelfError) {
        let endpoint = self.transport.describe();
        let pending = self.queue.len();
        log::debug!("GELF delivery to {endpoint} failed: {err}");
        self.warner.record_failure();
        self.warner.warn_if_due(|count| {
            if count == 1 {
                log::warn!("GELF delivery to {endpoint} failed: {err} ({pending} messages pending)");
            } else {
                log::warn!(
                    "{count} GELF delivery failures to {endpoint} since last warning, latest: {err} ({pending} messages pending)"
                );
            }
        });
    }

    /// Drop the live connection, ignoring close errors. Queued messages stay.
    pub fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            close_connection(connection);
        }
        let endpoint = self.transport.describe();
        self.warner.flush(|count| {
            log::warn!("{count} unreported GELF delivery failures to {endpoint}");
        });
    }
}

fn close_connection<C: Connection>(mut connection: C) {
    if let Err(err) = connection.close() {
        log::debug!("error closing GELF connection: {err}");
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Outbound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbound")
            .field("transport", &self.transport)
            .field("pending", &self.queue.len())
            .field("state", &self.state())
            .finish()
    }
}
