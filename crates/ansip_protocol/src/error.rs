//! Error types for SIP008 encoding and decoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while handling a SIP008 document.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The input contained no JSON value.
    #[error("empty document")]
    Empty,

    /// The input was not a valid SIP008 document.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The document could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The version tag is not the one this crate understands.
    #[error("invalid version: {0}")]
    UnsupportedVersion(i64),
}
