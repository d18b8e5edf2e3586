//! Error types for the padwire core.
//!
//! Strongly-typed errors for the two layers in this crate: session state
//! machine errors (protocol violations, cipher failures) and wire errors
//! (stream I/O, premature close).
//!
//! All of them end the exchange they occur in.

use std::io;

use padwire_proto::ProtocolError;
use thiserror::Error;

use crate::{cipher::CipherError, session::SessionState};

/// Errors from the session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation not valid in the current state
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred
        state: SessionState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Driver delivered a different number of bytes than requested
    #[error("unexpected read size in {state:?}: expected {expected} bytes, got {actual}")]
    UnexpectedReadSize {
        /// State that issued the read
        state: SessionState,
        /// Bytes requested
        expected: usize,
        /// Bytes delivered
        actual: usize,
    },

    /// Frame violated the wire protocol
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Key or payload rejected by the cipher engine
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
}

/// Errors from reading or writing a stream.
#[derive(Error, Debug)]
pub enum WireError {
    /// Peer closed the stream before the expected byte count arrived
    #[error("peer closed connection after {received} of {expected} bytes")]
    PeerClosed {
        /// Bytes the reader was waiting for
        expected: usize,
        /// Bytes received before the close
        received: usize,
    },

    /// Frame violated the wire protocol
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Underlying transport error
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl WireError {
    /// Returns true if the peer went away rather than misbehaving.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::PeerClosed { .. } => true,
            Self::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::WriteZero
            ),
            Self::Protocol(_) => false,
        }
    }
}
