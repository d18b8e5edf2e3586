//! Length-prefixed frames.
//!
//! Layout on the wire:
//!
//! ```text
//! +------------------+-------------------------+
//! | LENGTH (4B, BE)  | PAYLOAD (LENGTH bytes)  |
//! +------------------+-------------------------+
//! ```
//!
//! There is no terminator and no type byte. The stream does not preserve
//! message boundaries, so a receiver reads the prefix, then exactly `LENGTH`
//! more bytes, however many reads that takes.

use bytes::{BufMut, Bytes};

use crate::errors::{ProtocolError, Result};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// A key or payload frame.
///
/// # Invariants
///
/// - `payload.len()` fits in the `u32` length prefix.
/// - Frames produced by [`Frame::decode`] are never empty and never exceed
///   [`Frame::MAX_PAYLOAD_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Maximum payload size (16 MB).
    ///
    /// Checked on the length prefix, before the receiver allocates.
    pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

    /// Wrap a payload.
    ///
    /// Size limits are enforced by [`Frame::encode`], not here.
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self { payload: payload.into() }
    }

    /// Parse and validate a length prefix.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::EmptyFrame` if the length is zero
    /// - `ProtocolError::PayloadTooLarge` if the length exceeds
    ///   [`Frame::MAX_PAYLOAD_SIZE`]
    pub fn read_length(prefix: &[u8; LENGTH_PREFIX_SIZE]) -> Result<usize> {
        let length = u32::from_be_bytes(*prefix);

        if length == 0 {
            return Err(ProtocolError::EmptyFrame);
        }

        if length > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: length as usize,
                max: Self::MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(length as usize)
    }

    /// Encode the length prefix for this frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::EmptyFrame` for an empty payload
    /// - `ProtocolError::PayloadTooLarge` above [`Frame::MAX_PAYLOAD_SIZE`]
    pub fn length_prefix(&self) -> Result<[u8; LENGTH_PREFIX_SIZE]> {
        if self.payload.is_empty() {
            return Err(ProtocolError::EmptyFrame);
        }

        let length = u32::try_from(self.payload.len())
            .ok()
            .filter(|len| *len <= Self::MAX_PAYLOAD_SIZE)
            .ok_or(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: Self::MAX_PAYLOAD_SIZE as usize,
            })?;

        Ok(length.to_be_bytes())
    }

    /// Encode the frame into `dst` as `[length][payload]`.
    ///
    /// # Errors
    ///
    /// Same as [`Frame::length_prefix`]. Nothing is written on error.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let prefix = self.length_prefix()?;
        dst.put_slice(&prefix);
        dst.put_slice(&self.payload);
        Ok(())
    }

    /// Decode one frame from the front of `bytes`.
    ///
    /// Trailing bytes after the declared payload are ignored.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooShort` if the prefix itself is incomplete
    /// - errors from [`Frame::read_length`]
    /// - `ProtocolError::FrameTruncated` if fewer payload bytes are present
    ///   than declared
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let prefix: &[u8; LENGTH_PREFIX_SIZE] = bytes
            .get(..LENGTH_PREFIX_SIZE)
            .and_then(|p| p.try_into().ok())
            .ok_or(ProtocolError::FrameTooShort {
                expected: LENGTH_PREFIX_SIZE,
                actual: bytes.len(),
            })?;

        let length = Self::read_length(prefix)?;
        let body = &bytes[LENGTH_PREFIX_SIZE..];

        let payload = body.get(..length).ok_or(ProtocolError::FrameTruncated {
            expected: length,
            actual: body.len(),
        })?;

        Ok(Self { payload: Bytes::copy_from_slice(payload) })
    }

    /// Total encoded size (prefix + payload).
    #[must_use]
    pub fn wire_len(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.payload.len()
    }

    /// The payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
