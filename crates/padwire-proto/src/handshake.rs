//! Service selection handshake.
//!
//! The initiator opens with its credential, raw and unframed. The receiver
//! answers with a raw tag: the service's accept tag, or [`REJECT_TAG`]
//! followed by closing the connection.
//!
//! The credential is a fixed routing string, not a secret.

use std::fmt;

/// Upper bound on the credential bytes a receiver reads.
pub const MAX_CREDENTIAL_LEN: usize = 9;

/// Upper bound on the reply bytes an initiator reads.
pub const MAX_HANDSHAKE_REPLY_LEN: usize = 9;

/// Reply sent when the credential does not match.
pub const REJECT_TAG: &[u8] = b"reject";

/// The two cipher services sharing this protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Forward transform: plaintext in, ciphertext out.
    Encode,
    /// Inverse transform: ciphertext in, plaintext out.
    Decode,
}

impl Service {
    /// Credential an initiator presents to reach this service.
    #[must_use]
    pub fn credential(self) -> &'static [u8] {
        match self {
            Self::Encode => b"4321",
            Self::Decode => b"1234",
        }
    }

    /// Tag this service replies with on an accepted handshake.
    #[must_use]
    pub fn accept_tag(self) -> &'static [u8] {
        match self {
            Self::Encode => b"enc",
            Self::Decode => b"dec",
        }
    }

    /// Short name, matches the accept tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Encode => "enc",
            Self::Decode => "dec",
        }
    }

    /// Whether `credential` exactly matches this service's credential.
    #[must_use]
    pub fn accepts(self, credential: &[u8]) -> bool {
        self.credential() == credential
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiver's answer to a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeReply {
    /// Credential matched; carries the answering service.
    Accepted(Service),
    /// Credential did not match, or the reply was unrecognized.
    Rejected,
}

impl HandshakeReply {
    /// Raw bytes on the wire.
    #[must_use]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Accepted(service) => service.accept_tag(),
            Self::Rejected => REJECT_TAG,
        }
    }

    /// Interpret reply bytes read by the initiator.
    ///
    /// Only an exact accept tag counts as acceptance. Anything else,
    /// including partial or padded tags, is `Rejected`.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        [Service::Encode, Service::Decode]
            .into_iter()
            .find(|s| s.accept_tag() == bytes)
            .map_or(Self::Rejected, Self::Accepted)
    }

    /// Whether this reply accepts the handshake for `service` specifically.
    #[must_use]
    pub fn is_accepted_for(self, service: Service) -> bool {
        self == Self::Accepted(service)
    }
}
