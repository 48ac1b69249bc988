use thiserror::Error;

use crate::netid::ParseNetIdError;
use crate::transport::TransportError;
use crate::types::ModuleType;

/// Errors that can occur on an MDP client operation.
#[derive(Debug, Error)]
pub enum MdpError {
    /// The client has been closed; no further operations are possible.
    #[error("client is closed")]
    Closed,

    /// The client is not connected to a target.
    #[error("client is not connected")]
    NotConnected,

    /// The requested module type was not reported by the target.
    #[error("module type {0} is not present on the target")]
    ModuleNotPresent(ModuleType),

    /// No instance with the requested 1-based index exists for the module type.
    #[error("module type {module_type} has no instance {instance} (instances are 1-based)")]
    InstanceOutOfRange {
        module_type: ModuleType,
        instance: u32,
    },

    /// The resolved module id does not fit the 8-bit address field.
    #[error("module id {0} does not fit the 8-bit MDP address field")]
    ModuleIdOutOfRange(u16),

    /// A string value violates the fixed-length ASCII convention.
    #[error("invalid string parameter: {0}")]
    InvalidString(String),

    /// The target replied with fewer or more bytes than the scalar type needs.
    #[error("unexpected reply length: expected {expected} bytes, got {actual}")]
    ReplyLength { expected: usize, actual: usize },

    /// A reply could not be decoded into the requested scalar type.
    #[error("decode error: {0}")]
    Decode(String),

    /// The target address string could not be parsed.
    #[error(transparent)]
    InvalidTarget(#[from] ParseNetIdError),

    /// The raw transport reported a failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias using [`MdpError`].
pub type Result<T> = std::result::Result<T, MdpError>;
