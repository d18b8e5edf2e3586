//! Padwire requester.
//!
//! Client half of the exchange: validate the inputs locally, connect, pass
//! the handshake, send the key and payload frames, read the raw result.
//!
//! ```no_run
//! # async fn run() -> Result<(), padwire_client::ClientError> {
//! use padwire_client::{Request, Requester};
//! use padwire_proto::Service;
//!
//! let request = Request::new("XMCKL", "HELLO")?;
//! let ciphertext = Requester::new("127.0.0.1:5000", Service::Encode).exchange(&request).await?;
//! assert_eq!(ciphertext.len(), 5);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
mod error;
mod input;
mod request;
mod requester;

pub use error::ClientError;
pub use input::load_symbol_file;
pub use request::Request;
pub use requester::Requester;
