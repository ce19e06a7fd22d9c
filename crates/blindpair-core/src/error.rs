//! Error types for the pairing handshake.
//!
//! One taxonomy covers both sides of the exchange. Failures are always
//! local to the specific request/response they occurred on - nothing here
//! corrupts a coordinator or weakens later validation - and cryptographic
//! failures deliberately carry no detail that could act as an oracle.

use blindpair_crypto::CryptoError;
use blindpair_proto::{ResponseStatus, WireError};
use thiserror::Error;

/// Result alias for handshake operations.
pub type Result<T> = core::result::Result<T, PairingError>;

/// Errors surfaced by the candidate and member state machines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingError {
    /// A wire structure failed to decode (including unknown invite
    /// versions). The message is discarded.
    #[error("malformed message: {0}")]
    Malformed(#[from] WireError),

    /// AEAD authentication failed.
    ///
    /// Untrusted or garbage input; never distinguished from "wrong key".
    #[error("decryption failed")]
    Decryption,

    /// Envelope decrypted but the signature did not verify under the
    /// invite key. Treated exactly like garbage input.
    #[error("invalid signature")]
    InvalidSignature,

    /// The granted key does not hash to the discovery key this attempt was
    /// bound to - protocol confusion or an active attacker. Always fatal
    /// to the attempt.
    #[error("response does not match the expected discovery key")]
    DiscoveryKeyMismatch,

    /// The member answered with an explicit non-zero status.
    #[error("request denied: {status:?}")]
    Denied {
        /// Status code carried by the response.
        status: ResponseStatus,
    },

    /// The request could not be opened with the supplied key.
    ///
    /// Deliberately uniform: a wrong key and a forged request look the
    /// same, so probing reveals nothing about which keys this member
    /// holds.
    #[error("could not open request")]
    OpenFailed,

    /// The invite carries no discovery key, so an accepted response could
    /// never be verified against the protected key. Such invites are
    /// refused outright.
    #[error("invite does not carry a discovery key")]
    MissingDiscoveryKey,

    /// The attempt already reached a terminal state; no further outcome
    /// will be produced.
    #[error("request already resolved")]
    RequestClosed,

    /// The protected key is already joined on this coordinator.
    #[error("key is already joined")]
    AlreadyJoined,

    /// The protected key is not joined on this coordinator.
    #[error("key is not joined")]
    NotJoined,
}

impl From<CryptoError> for PairingError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::DecryptionFailed => Self::Decryption,
        }
    }
}

impl PairingError {
    /// Returns true if this error ends the candidate attempt.
    ///
    /// Terminal errors are authenticated outcomes (an explicit denial, a
    /// key that fails the binding check). Non-terminal errors are garbage
    /// input - the attempt keeps its secrets so a later, correct response
    /// can still land; an attacker must not be able to kill an attempt
    /// with junk.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Denied { .. } | Self::DiscoveryKeyMismatch | Self::RequestClosed => true,

            Self::Malformed(_)
            | Self::Decryption
            | Self::InvalidSignature
            | Self::OpenFailed
            | Self::MissingDiscoveryKey
            | Self::AlreadyJoined
            | Self::NotJoined => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denials_are_terminal() {
        assert!(PairingError::Denied { status: ResponseStatus::Rejected }.is_terminal());
        assert!(PairingError::DiscoveryKeyMismatch.is_terminal());
    }

    #[test]
    fn garbage_is_not_terminal() {
        assert!(!PairingError::Decryption.is_terminal());
        assert!(!PairingError::InvalidSignature.is_terminal());
        assert!(!PairingError::Malformed(WireError::UnexpectedEof { offset: 0 }).is_terminal());
    }

    #[test]
    fn crypto_errors_do_not_leak_detail() {
        let err = PairingError::from(CryptoError::DecryptionFailed);
        assert_eq!(err, PairingError::Decryption);
        assert_eq!(err.to_string(), "decryption failed");
    }
}
