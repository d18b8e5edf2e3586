//! Server-side session state machine.
//!
//! One `Session` handles one connection from handshake to close. It is pure:
//! the driver asks [`Session::next_read`] what to read, feeds the bytes to
//! [`Session::receive`], and executes the returned actions. Nothing here
//! touches a socket, which keeps chunked delivery, premature close and
//! protocol violations testable without a network.
//!
//! # State Machine
//!
//! ```text
//! AwaitingCredential ──mismatch──> Closed
//!        │ match
//!        ↓
//! AwaitingKeyLength → AwaitingKey → AwaitingPayloadLength → AwaitingPayload
//!                                                                  │
//!        Closed <── RespondingResult <── Transforming <────────────┘
//! ```
//!
//! Transitions only move forward. Any error closes the session.

use bytes::Bytes;
use padwire_proto::{Frame, HandshakeReply, LENGTH_PREFIX_SIZE, MAX_CREDENTIAL_LEN, Service};

use crate::{
    cipher::{self, CipherError, Direction},
    error::SessionError,
};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the raw handshake credential
    AwaitingCredential,
    /// Waiting for the key frame's length prefix
    AwaitingKeyLength,
    /// Waiting for the key bytes
    AwaitingKey,
    /// Waiting for the payload frame's length prefix
    AwaitingPayloadLength,
    /// Waiting for the payload bytes
    AwaitingPayload,
    /// Running the cipher
    Transforming,
    /// Result handed to the driver, waiting for the write to finish
    RespondingResult,
    /// Final state
    Closed,
}

/// What the driver should read next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadRequest {
    /// A single read of at most `max_len` bytes.
    ///
    /// The credential is unframed, so whatever one read returns is the
    /// credential.
    Credential {
        /// Read buffer size
        max_len: usize,
    },
    /// Exactly this many bytes, across as many reads as it takes.
    Exact(usize),
}

/// Actions returned by the session for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Write these bytes raw (no framing), fully
    Send(Bytes),

    /// Close the connection
    Close {
        /// Reason for closing, for logs
        reason: String,
    },
}

/// One served connection.
///
/// Owns the key buffer for the duration of the exchange; it is dropped when
/// the result is produced, on error, or with the session.
#[derive(Debug)]
pub struct Session {
    service: Service,
    state: SessionState,
    /// Length declared by the most recent prefix
    pending_len: usize,
    key: Option<Bytes>,
}

impl Session {
    /// Create a session for `service` in [`SessionState::AwaitingCredential`].
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self { service, state: SessionState::AwaitingCredential, pending_len: 0, key: None }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session has finished.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Next read the driver should perform. `None` when the session is not
    /// waiting for input.
    #[must_use]
    pub fn next_read(&self) -> Option<ReadRequest> {
        match self.state {
            SessionState::AwaitingCredential => {
                Some(ReadRequest::Credential { max_len: MAX_CREDENTIAL_LEN })
            },
            SessionState::AwaitingKeyLength | SessionState::AwaitingPayloadLength => {
                Some(ReadRequest::Exact(LENGTH_PREFIX_SIZE))
            },
            SessionState::AwaitingKey | SessionState::AwaitingPayload => {
                Some(ReadRequest::Exact(self.pending_len))
            },
            SessionState::Transforming
            | SessionState::RespondingResult
            | SessionState::Closed => None,
        }
    }

    /// Feed the bytes produced by the last [`ReadRequest`].
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidState` if the session is not reading
    /// - `SessionError::UnexpectedReadSize` if an exact read came back short
    ///   or long
    /// - `SessionError::Protocol` for a zero or oversized length prefix
    /// - `SessionError::Cipher` for symbols outside Alphabet-27 or a payload
    ///   longer than the key
    ///
    /// The session is closed after any error.
    pub fn receive(&mut self, bytes: Bytes) -> Result<Vec<SessionAction>, SessionError> {
        let result = self.step(bytes);
        if result.is_err() {
            self.close();
        }
        result
    }

    fn step(&mut self, bytes: Bytes) -> Result<Vec<SessionAction>, SessionError> {
        match self.state {
            SessionState::AwaitingCredential => Ok(self.handle_credential(&bytes)),
            SessionState::AwaitingKeyLength => {
                self.pending_len = self.read_prefix(&bytes)?;
                self.state = SessionState::AwaitingKey;
                Ok(Vec::new())
            },
            SessionState::AwaitingKey => {
                self.check_exact(&bytes)?;
                cipher::validate_symbols(&bytes)?;
                self.key = Some(bytes);
                self.state = SessionState::AwaitingPayloadLength;
                Ok(Vec::new())
            },
            SessionState::AwaitingPayloadLength => {
                let len = self.read_prefix(&bytes)?;
                let key_len = self.key.as_ref().map_or(0, Bytes::len);

                // Fail before buffering a payload the key cannot cover
                if len > key_len {
                    return Err(CipherError::KeyTooShort { key_len, message_len: len }.into());
                }

                self.pending_len = len;
                self.state = SessionState::AwaitingPayload;
                Ok(Vec::new())
            },
            SessionState::AwaitingPayload => {
                self.check_exact(&bytes)?;
                self.state = SessionState::Transforming;

                let key = self.key.take().ok_or(SessionError::InvalidState {
                    state: self.state,
                    operation: "transform without key",
                })?;
                let output = Direction::from(self.service).apply(&bytes, &key)?;

                self.state = SessionState::RespondingResult;
                Ok(vec![SessionAction::Send(Bytes::from(output))])
            },
            SessionState::Transforming | SessionState::RespondingResult | SessionState::Closed => {
                Err(SessionError::InvalidState { state: self.state, operation: "receive" })
            },
        }
    }

    fn handle_credential(&mut self, credential: &[u8]) -> Vec<SessionAction> {
        if self.service.accepts(credential) {
            self.state = SessionState::AwaitingKeyLength;
            return vec![SessionAction::Send(Bytes::from_static(
                HandshakeReply::Accepted(self.service).as_bytes(),
            ))];
        }

        self.close();
        vec![
            SessionAction::Send(Bytes::from_static(HandshakeReply::Rejected.as_bytes())),
            SessionAction::Close { reason: "credential rejected".to_string() },
        ]
    }

    fn read_prefix(&self, bytes: &[u8]) -> Result<usize, SessionError> {
        let prefix: &[u8; LENGTH_PREFIX_SIZE] =
            bytes.try_into().map_err(|_| SessionError::UnexpectedReadSize {
                state: self.state,
                expected: LENGTH_PREFIX_SIZE,
                actual: bytes.len(),
            })?;

        Ok(Frame::read_length(prefix)?)
    }

    fn check_exact(&self, bytes: &[u8]) -> Result<(), SessionError> {
        if bytes.len() == self.pending_len {
            Ok(())
        } else {
            Err(SessionError::UnexpectedReadSize {
                state: self.state,
                expected: self.pending_len,
                actual: bytes.len(),
            })
        }
    }

    /// Call once the result from [`SessionAction::Send`] has been fully
    /// written.
    ///
    /// # Errors
    ///
    /// `SessionError::InvalidState` unless in
    /// [`SessionState::RespondingResult`].
    pub fn on_result_sent(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != SessionState::RespondingResult {
            return Err(SessionError::InvalidState {
                state: self.state,
                operation: "finish response",
            });
        }

        self.close();
        Ok(vec![SessionAction::Close { reason: "exchange complete".to_string() }])
    }

    /// Mark the session closed and release its buffers.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.key = None;
        self.pending_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(len: u32) -> Bytes {
        Bytes::copy_from_slice(&len.to_be_bytes())
    }

    fn accepted(service: Service) -> Session {
        let mut session = Session::new(service);
        session.receive(Bytes::from_static(service.credential())).unwrap();
        session
    }

    #[test]
    fn full_exchange_walks_every_state() {
        let mut session = Session::new(Service::Encode);
        assert_eq!(
            session.next_read(),
            Some(ReadRequest::Credential { max_len: MAX_CREDENTIAL_LEN })
        );

        let actions = session.receive(Bytes::from_static(b"4321")).unwrap();
        assert_eq!(actions, vec![SessionAction::Send(Bytes::from_static(b"enc"))]);
        assert_eq!(session.state(), SessionState::AwaitingKeyLength);
        assert_eq!(session.next_read(), Some(ReadRequest::Exact(4)));

        assert!(session.receive(prefix(3)).unwrap().is_empty());
        assert_eq!(session.state(), SessionState::AwaitingKey);
        assert_eq!(session.next_read(), Some(ReadRequest::Exact(3)));

        assert!(session.receive(Bytes::from_static(b"BBB")).unwrap().is_empty());
        assert_eq!(session.state(), SessionState::AwaitingPayloadLength);

        assert!(session.receive(prefix(2)).unwrap().is_empty());
        assert_eq!(session.state(), SessionState::AwaitingPayload);
        assert_eq!(session.next_read(), Some(ReadRequest::Exact(2)));

        let actions = session.receive(Bytes::from_static(b"ZA")).unwrap();
        assert_eq!(actions, vec![SessionAction::Send(Bytes::from_static(b" B"))]);
        assert_eq!(session.state(), SessionState::RespondingResult);
        assert_eq!(session.next_read(), None);

        let actions = session.on_result_sent().unwrap();
        assert!(matches!(actions.as_slice(), [SessionAction::Close { .. }]));
        assert!(session.is_closed());
    }

    #[test]
    fn decode_service_inverts() {
        let mut session = accepted(Service::Decode);
        session.receive(prefix(1)).unwrap();
        session.receive(Bytes::from_static(b"B")).unwrap();
        session.receive(prefix(1)).unwrap();
        let actions = session.receive(Bytes::from_static(b" ")).unwrap();
        assert_eq!(actions, vec![SessionAction::Send(Bytes::from_static(b"Z"))]);
    }

    #[test]
    fn wrong_credential_rejects_and_closes() {
        let mut session = Session::new(Service::Encode);
        let actions = session.receive(Bytes::from_static(b"1234")).unwrap();

        assert_eq!(actions[0], SessionAction::Send(Bytes::from_static(b"reject")));
        assert!(matches!(actions[1], SessionAction::Close { .. }));
        assert!(session.is_closed());
        assert_eq!(session.next_read(), None);
    }

    #[test]
    fn credential_must_match_exactly() {
        for credential in [&b"432"[..], b"43210", b"4321\0", b""] {
            let mut session = Session::new(Service::Encode);
            session.receive(Bytes::copy_from_slice(credential)).unwrap();
            assert!(session.is_closed(), "{credential:?} should be rejected");
        }
    }

    #[test]
    fn zero_length_key_closes() {
        let mut session = accepted(Service::Encode);
        let err = session.receive(prefix(0)).unwrap_err();
        assert!(matches!(err, SessionError::Protocol(_)));
        assert!(session.is_closed());
    }

    #[test]
    fn oversized_length_closes_before_allocation() {
        let mut session = accepted(Service::Encode);
        assert!(session.receive(prefix(u32::MAX)).is_err());
        assert!(session.is_closed());
        assert_eq!(session.next_read(), None);
    }

    #[test]
    fn payload_longer_than_key_closes_before_read() {
        let mut session = accepted(Service::Encode);
        session.receive(prefix(2)).unwrap();
        session.receive(Bytes::from_static(b"AB")).unwrap();

        let err = session.receive(prefix(3)).unwrap_err();
        assert_eq!(
            err,
            SessionError::Cipher(CipherError::KeyTooShort { key_len: 2, message_len: 3 })
        );
        assert!(session.is_closed());
    }

    #[test]
    fn invalid_key_symbol_closes() {
        let mut session = accepted(Service::Encode);
        session.receive(prefix(2)).unwrap();
        let err = session.receive(Bytes::from_static(b"a!")).unwrap_err();
        assert!(matches!(err, SessionError::Cipher(CipherError::InvalidSymbol { index: 0, .. })));
        assert!(session.is_closed());
    }

    #[test]
    fn invalid_payload_symbol_produces_no_response() {
        let mut session = accepted(Service::Encode);
        session.receive(prefix(2)).unwrap();
        session.receive(Bytes::from_static(b"AB")).unwrap();
        session.receive(prefix(2)).unwrap();
        assert!(session.receive(Bytes::from_static(b"A\n")).is_err());
        assert!(session.is_closed());
    }

    #[test]
    fn short_delivery_is_rejected() {
        let mut session = accepted(Service::Encode);
        session.receive(prefix(4)).unwrap();
        let err = session.receive(Bytes::from_static(b"AB")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::UnexpectedReadSize { expected: 4, actual: 2, .. }
        ));
    }

    #[test]
    fn closed_session_rejects_input() {
        let mut session = Session::new(Service::Encode);
        session.close();
        assert!(matches!(
            session.receive(Bytes::from_static(b"4321")),
            Err(SessionError::InvalidState { state: SessionState::Closed, .. })
        ));
        assert!(session.on_result_sent().is_err());
    }
}
