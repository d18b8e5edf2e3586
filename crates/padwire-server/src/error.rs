//! Server error types.

use std::fmt;

use padwire_core::{SessionError, WireError};

/// Errors that can occur in the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, zero port, etc.).
    ///
    /// Fatal at startup. Fix configuration and restart.
    Config(String),

    /// Listener error (bind, listen or accept failure).
    ///
    /// Fatal when returned from `bind`. Accept failures are logged by the
    /// accept loop, which keeps running.
    Transport(String),

    /// Stream error inside one session (I/O failure, premature close).
    ///
    /// Fatal for that connection only.
    Wire(WireError),

    /// Protocol or cipher violation inside one session.
    ///
    /// Indicates a client sent malformed data. Fatal for that connection,
    /// but the server keeps serving other clients.
    Session(SessionError),
}

impl ServerError {
    /// Returns true if the peer disconnected rather than misbehaving.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Wire(err) if err.is_disconnect())
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Wire(err) => write!(f, "wire error: {err}"),
            Self::Session(err) => write!(f, "session error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(err) => Some(err),
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WireError> for ServerError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<SessionError> for ServerError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
