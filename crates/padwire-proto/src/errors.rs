//! Protocol error types.
//!
//! Every variant is terminal for the exchange it occurs in. Nothing in the
//! protocol is retried.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from frame encoding and decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Length prefix declared a zero-byte frame.
    #[error("frame declares an empty payload")]
    EmptyFrame,

    /// Payload exceeds [`crate::Frame::MAX_PAYLOAD_SIZE`].
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Declared or actual payload size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Buffer is shorter than the 4-byte length prefix.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Buffer holds fewer payload bytes than the prefix declares.
    #[error("frame truncated: expected {expected} payload bytes, got {actual}")]
    FrameTruncated {
        /// Payload bytes declared by the prefix
        expected: usize,
        /// Payload bytes available
        actual: usize,
    },
}
