//! Input-file loading.
//!
//! A file holds one line of symbols. Everything from the first newline on
//! is ignored, so a trailing newline (or anything after it) is harmless.

use std::{fs, path::Path};

use bytes::Bytes;
use padwire_core::cipher;

use crate::error::ClientError;

/// Read `path` and return the symbols before its first newline.
///
/// `what` names the input in error messages.
///
/// # Errors
///
/// - `ClientError::ReadInput` if the file cannot be read
/// - `ClientError::EmptyInput` if no symbols precede the first newline
/// - `ClientError::BadCharacters` for bytes outside Alphabet-27
pub fn load_symbol_file(path: impl AsRef<Path>, what: &'static str) -> Result<Bytes, ClientError> {
    let path = path.as_ref();
    let mut contents = fs::read(path)
        .map_err(|source| ClientError::ReadInput { path: path.to_path_buf(), source })?;

    if let Some(end) = contents.iter().position(|&b| b == b'\n') {
        contents.truncate(end);
    }

    if contents.is_empty() {
        return Err(ClientError::EmptyInput { what });
    }

    cipher::validate_symbols(&contents)
        .map_err(|source| ClientError::BadCharacters { what, source })?;

    Ok(Bytes::from(contents))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn file_with(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn strips_trailing_newline() {
        let file = file_with(b"THE RED GOOSE FLIES AT MIDNIGHT\n");
        let text = load_symbol_file(file.path(), "plaintext").unwrap();
        assert_eq!(&text[..], b"THE RED GOOSE FLIES AT MIDNIGHT");
    }

    #[test]
    fn ignores_everything_after_first_newline() {
        let file = file_with(b"ABC\nlowercase $$$\n");
        assert_eq!(&load_symbol_file(file.path(), "key").unwrap()[..], b"ABC");
    }

    #[test]
    fn accepts_missing_newline() {
        let file = file_with(b"NO NEWLINE");
        assert_eq!(&load_symbol_file(file.path(), "key").unwrap()[..], b"NO NEWLINE");
    }

    #[test]
    fn rejects_empty_file() {
        for contents in [&b""[..], b"\n", b"\nABC"] {
            let file = file_with(contents);
            assert!(matches!(
                load_symbol_file(file.path(), "plaintext"),
                Err(ClientError::EmptyInput { what: "plaintext" })
            ));
        }
    }

    #[test]
    fn rejects_bad_characters() {
        let file = file_with(b"HELLO, WORLD\n");
        let err = load_symbol_file(file.path(), "plaintext").unwrap_err();
        assert!(matches!(
            err,
            ClientError::BadCharacters {
                source: cipher::CipherError::InvalidSymbol { index: 5, byte: b',' },
                ..
            }
        ));
    }

    #[test]
    fn rejects_carriage_return() {
        let file = file_with(b"HELLO\r\n");
        assert!(matches!(
            load_symbol_file(file.path(), "key"),
            Err(ClientError::BadCharacters { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_symbol_file(dir.path().join("absent"), "key").unwrap_err();
        assert!(matches!(err, ClientError::ReadInput { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
