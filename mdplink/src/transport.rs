//! The raw-transport boundary.
//!
//! The MDP layer does not implement framing, session negotiation or
//! retransmission; it drives whatever [`Transport`] it is given. Requests
//! are addressed by an index group and a 32-bit index offset; payloads
//! are plain byte buffers.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::netid::AmsNetId;

/// A failure reported by the raw transport, carrying its own error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error {code:#06x}: {message}")]
pub struct TransportError {
    /// Device error code as defined by the transport protocol.
    pub code: u32,
    pub message: String,
}

impl TransportError {
    /// Target machine not reachable.
    pub const TARGET_NOT_FOUND: u32 = 0x0007;
    /// The requested service is not supported by the target.
    pub const SERVICE_NOT_SUPPORTED: u32 = 0x0701;
    /// No object registered at the requested address.
    pub const SYMBOL_NOT_FOUND: u32 = 0x0710;
    /// Write to a read-only object.
    pub const ACCESS_DENIED: u32 = 0x0712;

    pub fn new(code: u32, message: impl Into<String>) -> Self {
        TransportError {
            code,
            message: message.into(),
        }
    }
}

/// The raw read-write primitive this crate adapts.
///
/// Implementations manage their own interior mutability; the client only
/// ever holds a `Box<dyn Transport>` and calls it through `&self`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a session to the target device.
    async fn open(&self, target: &AmsNetId) -> Result<(), TransportError>;

    /// Closes the session. Returns whether a session had been open.
    async fn close(&self) -> bool;

    /// Whether a session is currently open.
    fn is_connected(&self) -> bool;

    /// Whether the session targets the local device.
    fn is_local(&self) -> bool;

    /// Request timeout of the session.
    fn timeout(&self) -> Duration;
    fn set_timeout(&self, timeout: Duration);

    /// Reads up to `buf.len()` bytes from `(index_group, index_offset)`.
    /// Returns the number of bytes the target actually supplied.
    async fn read(
        &self,
        index_group: u32,
        index_offset: u32,
        buf: &mut [u8],
    ) -> Result<usize, TransportError>;

    /// Writes `data` to `(index_group, index_offset)`.
    async fn write(
        &self,
        index_group: u32,
        index_offset: u32,
        data: &[u8],
    ) -> Result<(), TransportError>;
}
