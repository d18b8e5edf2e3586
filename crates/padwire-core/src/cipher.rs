//! Alphabet-27 substitution cipher.
//!
//! Symbols are the 26 uppercase ASCII letters plus space. Each maps to a
//! value in `[0, 26]` (letters by alphabet position, space to 26). Encoding
//! adds the key value modulo 27, decoding subtracts it. Both inputs are
//! always in range, so a single correction step replaces a full `%`.
//!
//! Pure functions: no I/O, no state, only the output buffer is allocated.

use padwire_proto::Service;
use thiserror::Error;

/// The 27 valid symbols, in value order.
pub const ALPHABET: &[u8; 27] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Number of symbols (the modulus).
pub const SYMBOL_COUNT: u8 = 27;

const SPACE_VALUE: u8 = 26;

/// Errors from the cipher engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    /// Byte outside Alphabet-27.
    #[error("invalid symbol {byte:#04x} at index {index}")]
    InvalidSymbol {
        /// Position in the input
        index: usize,
        /// Offending byte
        byte: u8,
    },

    /// Key has fewer symbols than the message.
    #[error("key too short: {key_len} symbols for a {message_len}-symbol message")]
    KeyTooShort {
        /// Key length
        key_len: usize,
        /// Message length
        message_len: usize,
    },
}

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Addition modulo 27 (encryption).
    Forward,
    /// Subtraction modulo 27 (decryption).
    Inverse,
}

impl Direction {
    /// Apply this direction to `message` using `key`.
    pub fn apply(self, message: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
        match self {
            Self::Forward => encode(message, key),
            Self::Inverse => decode(message, key),
        }
    }
}

impl From<Service> for Direction {
    fn from(service: Service) -> Self {
        match service {
            Service::Encode => Self::Forward,
            Service::Decode => Self::Inverse,
        }
    }
}

/// Whether `byte` belongs to Alphabet-27.
#[must_use]
pub fn is_symbol(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte == b' '
}

/// Check that every byte belongs to Alphabet-27.
///
/// # Errors
///
/// `CipherError::InvalidSymbol` for the first offending byte.
pub fn validate_symbols(text: &[u8]) -> Result<(), CipherError> {
    match text.iter().position(|&b| !is_symbol(b)) {
        Some(index) => Err(CipherError::InvalidSymbol { index, byte: text[index] }),
        None => Ok(()),
    }
}

/// Numeric value of a symbol.
///
/// `index` is only used for error reporting.
fn value_at(byte: u8, index: usize) -> Result<u8, CipherError> {
    match byte {
        b'A'..=b'Z' => Ok(byte - b'A'),
        b' ' => Ok(SPACE_VALUE),
        _ => Err(CipherError::InvalidSymbol { index, byte }),
    }
}

/// Numeric value of a symbol.
///
/// # Errors
///
/// `CipherError::InvalidSymbol` (with index 0) if `byte` is outside
/// Alphabet-27.
pub fn symbol_value(byte: u8) -> Result<u8, CipherError> {
    value_at(byte, 0)
}

/// Symbol for a value in `[0, 26]`.
#[must_use]
pub fn value_symbol(value: u8) -> u8 {
    debug_assert!(value < SYMBOL_COUNT);
    ALPHABET[usize::from(value)]
}

fn transform(
    message: &[u8],
    key: &[u8],
    combine: impl Fn(u8, u8) -> u8,
) -> Result<Vec<u8>, CipherError> {
    if key.len() < message.len() {
        return Err(CipherError::KeyTooShort { key_len: key.len(), message_len: message.len() });
    }

    message
        .iter()
        .zip(key)
        .enumerate()
        .map(|(i, (&m, &k))| Ok(value_symbol(combine(value_at(m, i)?, value_at(k, i)?))))
        .collect()
}

/// Forward transform. Output has the same length as `message`.
///
/// Only the first `message.len()` key symbols are used.
///
/// # Errors
///
/// - `CipherError::KeyTooShort` if `key` is shorter than `message`
/// - `CipherError::InvalidSymbol` if either input leaves Alphabet-27
pub fn encode(message: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    transform(message, key, |m, k| {
        let sum = m + k;
        if sum >= SYMBOL_COUNT { sum - SYMBOL_COUNT } else { sum }
    })
}

/// Inverse transform of [`encode`] under the same key.
///
/// # Errors
///
/// Same as [`encode`].
pub fn decode(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    transform(ciphertext, key, |c, k| if c < k { c + SYMBOL_COUNT - k } else { c - k })
}
