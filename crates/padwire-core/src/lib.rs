//! Padwire core.
//!
//! Protocol logic shared by the server and client crates:
//!
//! - [`cipher`]: the Alphabet-27 substitution transform (pure functions)
//! - [`session`]: the server-side session state machine (Sans-IO)
//! - [`wire`]: async read/write helpers that implement the framing contract
//! - [`keygen`]: random key sequences
//!
//! # Sans-IO
//!
//! [`Session`] never performs I/O. It tells the driver what to read next and
//! returns [`SessionAction`]s to execute. The driver in `padwire-server` owns
//! the socket; tests drive the same state machine with plain byte buffers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod error;
pub mod keygen;
pub mod session;
pub mod wire;

pub use cipher::{CipherError, Direction};
pub use error::{SessionError, WireError};
pub use session::{ReadRequest, Session, SessionAction, SessionState};
