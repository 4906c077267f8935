//! Byte source trait for oximeter streams

use crate::Result;

/// Source of raw bytes from an oximeter link.
///
/// Sources abstract over the transport (serial device, socket, in-memory
/// buffer) and handle their own blocking internally. The driver awaits one
/// byte at a time and races each read against cancellation, so an
/// implementation must be cancel-safe: dropping a pending `next_byte`
/// future must not lose a byte that was already taken off the transport.
#[async_trait::async_trait]
pub trait ByteSource: Send + 'static {
    /// Get the next byte from the stream
    ///
    /// Returns:
    /// - `Ok(Some(byte))` - Next byte available
    /// - `Ok(None)` - Stream ended (normal termination)
    /// - `Err(e)` - Read failed; the driver may call again after backing off
    async fn next_byte(&mut self) -> Result<Option<u8>>;
}
