//! Padwire wire protocol.
//!
//! Encode/decode contracts for the cipher service protocol. This crate does
//! no I/O; see `padwire-core` for the async stream helpers and the session
//! state machine.
//!
//! # Exchange
//!
//! ```text
//! initiator                         receiver
//!     | -- credential (raw) --------> |
//!     | <-- accept tag | reject (raw) |   reject: receiver closes
//!     | -- key frame ---------------> |
//!     | -- payload frame -----------> |
//!     | <-- result (raw, len = payload len)
//! ```
//!
//! The result is deliberately unframed: the initiator already knows its
//! length from the payload it sent.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod frame;
pub mod handshake;

pub use errors::{ProtocolError, Result};
pub use frame::{Frame, LENGTH_PREFIX_SIZE};
pub use handshake::{
    HandshakeReply, MAX_CREDENTIAL_LEN, MAX_HANDSHAKE_REPLY_LEN, REJECT_TAG, Service,
};
