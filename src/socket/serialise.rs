//! JSON encoding of envelopes with the datagram size gate.

use crate::envelope::Envelope;
use crate::error::GelfError;

/// Largest encoded message accepted for delivery, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 65_534;

/// Payloads this short carry no message and are discarded at send time.
pub const MIN_PAYLOAD_SIZE: usize = 3;

/// Encode `envelope` using the default size limit.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, GelfError> {
    encode_with_limit(envelope, MAX_MESSAGE_SIZE)
}

/// Encode `envelope`, rejecting payloads longer than `max_size` bytes.
pub fn encode_with_limit(envelope: &Envelope, max_size: usize) -> Result<Vec<u8>, GelfError> {
    let mut buf = Vec::with_capacity(256);
    serde_json::to_writer(&mut buf, envelope)?;
    if buf.len() > max_size {
        return Err(GelfError::Oversize {
            length: buf.len(),
            max: max_size,
        });
    }
    Ok(buf)
}
