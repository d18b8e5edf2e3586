//! Client error types.

use std::{io, path::PathBuf};

use padwire_core::{CipherError, WireError};
use thiserror::Error;

/// Errors that end a client run.
///
/// Input problems are caught before any connection is attempted.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Input file could not be read
    #[error("cannot read {}: {source}", path.display())]
    ReadInput {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Input has no symbols before its first newline
    #[error("{what} is empty")]
    EmptyInput {
        /// Which input
        what: &'static str,
    },

    /// Input contains a byte outside Alphabet-27
    #[error("{what} contains bad characters: {source}")]
    BadCharacters {
        /// Which input
        what: &'static str,
        /// Offending position
        source: CipherError,
    },

    /// Input longer than one frame can carry
    #[error("{what} is too long: {len} symbols (max {max})")]
    TooLong {
        /// Which input
        what: &'static str,
        /// Input length
        len: usize,
        /// Frame payload limit
        max: usize,
    },

    /// Key cannot cover the payload
    #[error("key is too short: {key_len} symbols for a {payload_len}-symbol payload")]
    KeyTooShort {
        /// Key length
        key_len: usize,
        /// Payload length
        payload_len: usize,
    },

    /// Could not reach the server
    #[error("could not contact server on {addr}: {source}")]
    Connect {
        /// Address dialed
        addr: String,
        /// Underlying error
        source: io::Error,
    },

    /// Server answered the handshake with anything but our accept tag
    #[error("handshake rejected by server (reply {reply:?})")]
    HandshakeRejected {
        /// Reply as received, lossily decoded
        reply: String,
    },

    /// Transfer failed after the handshake
    #[error("transfer failed: {0}")]
    Wire(#[from] WireError),
}

impl ClientError {
    /// Process exit status for this error.
    ///
    /// `1` for local input problems, `2` for connection, transfer and
    /// handshake failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ReadInput { .. }
            | Self::EmptyInput { .. }
            | Self::BadCharacters { .. }
            | Self::TooLong { .. }
            | Self::KeyTooShort { .. } => 1,
            Self::Connect { .. } | Self::HandshakeRejected { .. } | Self::Wire(_) => 2,
        }
    }
}
