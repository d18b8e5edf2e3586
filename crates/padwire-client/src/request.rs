//! Validated key and payload pair.

use bytes::Bytes;
use padwire_core::cipher;
use padwire_proto::Frame;

use crate::error::ClientError;

/// Key and payload checked against Alphabet-27 and each other.
///
/// Only a `Request` can be sent, so invalid input never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    key: Bytes,
    payload: Bytes,
}

impl Request {
    /// Validate and pair `key` with `payload`.
    ///
    /// # Errors
    ///
    /// - `ClientError::EmptyInput` if either is empty
    /// - `ClientError::TooLong` if either exceeds [`Frame::MAX_PAYLOAD_SIZE`]
    /// - `ClientError::BadCharacters` for bytes outside Alphabet-27
    /// - `ClientError::KeyTooShort` if the key is shorter than the payload
    pub fn new(key: impl Into<Bytes>, payload: impl Into<Bytes>) -> Result<Self, ClientError> {
        let key = key.into();
        let payload = payload.into();

        check("payload", &payload)?;
        check("key", &key)?;

        if key.len() < payload.len() {
            return Err(ClientError::KeyTooShort { key_len: key.len(), payload_len: payload.len() });
        }

        Ok(Self { key, payload })
    }

    /// Key bytes.
    pub fn key(&self) -> &Bytes {
        &self.key
    }

    /// Payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}

fn check(what: &'static str, text: &[u8]) -> Result<(), ClientError> {
    if text.is_empty() {
        return Err(ClientError::EmptyInput { what });
    }

    let max = Frame::MAX_PAYLOAD_SIZE as usize;
    if text.len() > max {
        return Err(ClientError::TooLong { what, len: text.len(), max });
    }

    cipher::validate_symbols(text).map_err(|source| ClientError::BadCharacters { what, source })
}
