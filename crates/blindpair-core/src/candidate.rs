//! Candidate-side request state machine.
//!
//! A `CandidateRequest` is one in-flight redemption attempt from the
//! joining party's side. Construction is pure: given the same (seed,
//! user data, session) it reproduces a byte-identical wire request, which
//! is what makes persistence and retries safe.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐  granted response   ┌──────────┐
//! │ Pending │────────────────────>│ Accepted │ (key cached, secrets cleared)
//! └─────────┘                     └──────────┘
//!      │ denial / binding mismatch     ┌──────────┐
//!      ├───────────────────────────────>│ Rejected │ (secrets cleared)
//!      │ destroy()                      └──────────┘
//!      ↓
//! ┌───────────┐
//! │ Destroyed │
//! └───────────┘
//! ```
//!
//! Garbage responses (failed decryption, malformed plaintext) are *not*
//! transitions: the error is returned and the attempt stays `Pending`, so
//! an attacker cannot kill it with junk. Terminal states resolve exactly
//! once; later responses get [`PairingError::RequestClosed`].

use blindpair_crypto as crypto;
use blindpair_proto::{
    FastForwardTo, Invite, InviteRequest, InviteResponse, PersistedRequest, RequestPayload,
    ResponsePayload,
};
use bytes::Bytes;
use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    envelope,
    error::{PairingError, Result},
};

/// Lifecycle of a candidate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    /// Request constructed, no terminal response yet.
    Pending,
    /// A genuine response granted the protected key.
    Accepted,
    /// A genuine response denied the attempt, or the granted key failed
    /// the discovery-key binding check.
    Rejected,
    /// Explicitly abandoned before any terminal response.
    Destroyed,
}

/// What an accepted response granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingDetails {
    /// The protected key the invite was issued for.
    pub key: [u8; 32],
    /// Optional secondary encryption key handed over by the member.
    pub encryption_key: Option<[u8; 32]>,
    /// Optional free-form data from the member.
    pub data: Option<Bytes>,
    /// Optional hint to skip ahead in a related log structure.
    pub fast_forward_to: Option<FastForwardTo>,
}

/// One in-flight redemption attempt (candidate side).
pub struct CandidateRequest {
    seed: [u8; 32],
    discovery_key: [u8; 32],
    user_data: Bytes,
    public_key: [u8; 32],
    id: [u8; 32],
    request_id: [u8; 32],
    /// Cleared on terminal transitions.
    session: Option<[u8; 32]>,
    /// Cleared on terminal transitions.
    payload: Option<RequestPayload>,
    /// Memoized wire request; ciphertext only, safe to keep.
    encoded: Bytes,
    state: CandidateState,
    /// Cached after acceptance (and across persistence).
    key: Option<[u8; 32]>,
}

impl CandidateRequest {
    /// Construct an attempt from raw invite bytes with the default
    /// (derived, deterministic) session token.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Malformed`] if the invite fails to decode
    /// - [`PairingError::MissingDiscoveryKey`] if it carries no discovery
    ///   key
    pub fn new(invite: &[u8], user_data: &[u8]) -> Result<Self> {
        Self::from_invite(&Invite::decode(invite)?, user_data, None)
    }

    /// Construct with a caller-chosen session token, for correlating an
    /// attempt across retries or processes.
    pub fn with_session(invite: &[u8], user_data: &[u8], session: [u8; 32]) -> Result<Self> {
        Self::from_invite(&Invite::decode(invite)?, user_data, Some(session))
    }

    /// Construct from an already-decoded invite.
    ///
    /// Pure given (seed, user data, session): the resulting wire request is
    /// byte-identical across constructions.
    pub fn from_invite(
        invite: &Invite,
        user_data: &[u8],
        session: Option<[u8; 32]>,
    ) -> Result<Self> {
        let discovery_key = invite.discovery_key.ok_or(PairingError::MissingDiscoveryKey)?;

        let keypair = SigningKey::from_bytes(&invite.seed);
        let public_key = keypair.verifying_key().to_bytes();
        let id = crypto::invite_id(&public_key);

        let session = session.unwrap_or_else(|| {
            let token = Zeroizing::new(crypto::derive_token(&public_key, user_data));
            crypto::derive_session_token(&token)
        });
        let request_id = crypto::derive_request_id(&session);

        let payload = envelope::create_auth(user_data, &keypair, &session);
        let encoded = InviteRequest { id, payload: payload.clone() }.encode();

        Ok(Self {
            seed: invite.seed,
            discovery_key,
            user_data: Bytes::copy_from_slice(user_data),
            public_key,
            id,
            request_id,
            session: Some(session),
            payload: Some(payload),
            encoded,
            state: CandidateState::Pending,
            key: None,
        })
    }

    /// Reconstruct an attempt from its persisted form.
    ///
    /// Uses the derived session, so the rebuilt request matches the
    /// original byte for byte; an attempt constructed with an explicit
    /// session must be rebuilt through [`Self::with_session`] instead.
    /// Restoring a completed attempt yields a terminal object with the
    /// cached key and no secret material.
    pub fn from_persisted(bytes: &[u8]) -> Result<Self> {
        let persisted = PersistedRequest::decode(bytes)?;
        let invite = Invite {
            seed: persisted.seed,
            discovery_key: Some(persisted.discovery_key),
            expires: None,
            sensitive: false,
        };
        let mut request = Self::from_invite(&invite, &persisted.user_data, None)?;
        if let Some(key) = persisted.key {
            request.key = Some(key);
            request.state = CandidateState::Accepted;
            request.clear_secrets();
        }
        Ok(request)
    }

    /// Serialize the minimal state needed to rebuild this attempt after a
    /// restart.
    pub fn persist(&self) -> Bytes {
        PersistedRequest {
            seed: self.seed,
            discovery_key: self.discovery_key,
            user_data: self.user_data.clone(),
            key: self.key,
        }
        .encode()
    }

    /// The wire `InviteRequest` for this attempt (memoized; cheap to call
    /// repeatedly).
    pub fn encode(&self) -> Bytes {
        self.encoded.clone()
    }

    /// Handle a raw `InviteResponse` message.
    ///
    /// The correlation id is routing metadata for the coordinator; it is
    /// not re-checked here - a mismatched response simply fails to
    /// decrypt.
    pub fn handle_response(&mut self, response: &[u8]) -> Result<PairingDetails> {
        let response = InviteResponse::decode(response)?;
        self.handle_response_payload(&response.payload)
    }

    /// Handle an already-extracted response ciphertext.
    ///
    /// # Errors
    ///
    /// Non-terminal (attempt stays pending, secrets retained):
    /// - [`PairingError::Decryption`], [`PairingError::Malformed`] -
    ///   garbage or mismatched input
    ///
    /// Terminal (secrets cleared, no further outcome possible):
    /// - [`PairingError::Denied`] - authenticated explicit denial
    /// - [`PairingError::DiscoveryKeyMismatch`] - granted key fails the
    ///   binding check
    /// - [`PairingError::RequestClosed`] - the attempt was already
    ///   resolved or destroyed
    pub fn handle_response_payload(&mut self, payload: &[u8]) -> Result<PairingDetails> {
        match self.open_response(payload) {
            Ok(details) => {
                self.key = Some(details.key);
                self.state = CandidateState::Accepted;
                self.clear_secrets();
                Ok(details)
            },
            Err(err) => {
                if err.is_terminal() && self.state == CandidateState::Pending {
                    self.state = CandidateState::Rejected;
                    self.clear_secrets();
                }
                Err(err)
            },
        }
    }

    /// Decrypt and validate a response without mutating state.
    fn open_response(&self, payload: &[u8]) -> Result<PairingDetails> {
        if self.state != CandidateState::Pending {
            return Err(PairingError::RequestClosed);
        }
        let Some(session) = &self.session else {
            return Err(PairingError::RequestClosed);
        };

        let plaintext = Zeroizing::new(envelope::open_reply(payload, session, &self.public_key)?);
        match ResponsePayload::decode(&plaintext)? {
            ResponsePayload::Denied { status } => Err(PairingError::Denied { status }),
            ResponsePayload::Granted { key, encryption_key, data, fast_forward_to } => {
                if crypto::discovery_key(&key) != self.discovery_key {
                    return Err(PairingError::DiscoveryKeyMismatch);
                }
                Ok(PairingDetails { key, encryption_key, data, fast_forward_to })
            },
        }
    }

    /// Abandon the attempt. Idempotent; clears secret material.
    pub fn destroy(&mut self) {
        if self.state == CandidateState::Pending {
            self.state = CandidateState::Destroyed;
        }
        self.clear_secrets();
    }

    fn clear_secrets(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.zeroize();
        }
        self.payload = None;
    }

    /// Invite id this attempt was made under (routing, not secret).
    pub fn id(&self) -> &[u8; 32] {
        &self.id
    }

    /// Correlation id responses must carry.
    pub fn request_id(&self) -> &[u8; 32] {
        &self.request_id
    }

    /// Discovery key the attempt is bound to.
    pub fn discovery_key(&self) -> &[u8; 32] {
        &self.discovery_key
    }

    /// User data submitted with the request.
    pub fn user_data(&self) -> &Bytes {
        &self.user_data
    }

    /// Session token, until a terminal transition clears it.
    pub fn session(&self) -> Option<&[u8; 32]> {
        self.session.as_ref()
    }

    /// The protected key, once accepted (survives persistence).
    pub fn key(&self) -> Option<&[u8; 32]> {
        self.key.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CandidateState {
        self.state
    }
}

impl Drop for CandidateRequest {
    fn drop(&mut self) {
        self.seed.zeroize();
        self.clear_secrets();
    }
}

impl std::fmt::Debug for CandidateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets (seed, session) are deliberately omitted
        f.debug_struct("CandidateRequest")
            .field("id", &self.id)
            .field("request_id", &self.request_id)
            .field("discovery_key", &self.discovery_key)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invite::{InviteOptions, create_invite_with_seed};

    const PROTECTED_KEY: [u8; 32] = [0x01; 32];
    const SEED: [u8; 32] = [0x05; 32];

    fn invite_bytes() -> Bytes {
        create_invite_with_seed(&PROTECTED_KEY, &SEED, &InviteOptions::default()).invite
    }

    #[test]
    fn construction_is_deterministic() {
        let a = CandidateRequest::new(&invite_bytes(), b"hello world").unwrap();
        let b = CandidateRequest::new(&invite_bytes(), b"hello world").unwrap();
        assert_eq!(a.encode(), b.encode());
        assert_eq!(a.request_id(), b.request_id());
    }

    #[test]
    fn different_user_data_different_request() {
        let a = CandidateRequest::new(&invite_bytes(), b"alpha").unwrap();
        let b = CandidateRequest::new(&invite_bytes(), b"beta").unwrap();
        assert_ne!(a.encode(), b.encode());
        assert_ne!(a.request_id(), b.request_id());
    }

    #[test]
    fn explicit_session_is_used() {
        let session = [0xff; 32];
        let request =
            CandidateRequest::with_session(&invite_bytes(), b"hello", session).unwrap();
        assert_eq!(request.session(), Some(&session));
        assert_eq!(request.request_id(), &crypto::derive_request_id(&session));
    }

    #[test]
    fn invite_without_discovery_key_is_refused() {
        let invite =
            Invite { seed: SEED, discovery_key: None, expires: None, sensitive: false };
        let err = CandidateRequest::from_invite(&invite, b"hello", None).unwrap_err();
        assert_eq!(err, PairingError::MissingDiscoveryKey);
    }

    #[test]
    fn garbage_response_keeps_attempt_pending() {
        let mut request = CandidateRequest::new(&invite_bytes(), b"hello").unwrap();

        let err = request.handle_response_payload(&[0u8; 48]).unwrap_err();
        assert_eq!(err, PairingError::Decryption);
        assert_eq!(request.state(), CandidateState::Pending);
        assert!(request.session().is_some(), "secrets must survive garbage");
    }

    #[test]
    fn destroy_is_idempotent_and_clears_secrets() {
        let mut request = CandidateRequest::new(&invite_bytes(), b"hello").unwrap();

        request.destroy();
        assert_eq!(request.state(), CandidateState::Destroyed);
        assert!(request.session().is_none());

        request.destroy();
        assert_eq!(request.state(), CandidateState::Destroyed);
    }

    #[test]
    fn responses_after_destroy_are_closed() {
        let mut request = CandidateRequest::new(&invite_bytes(), b"hello").unwrap();
        request.destroy();
        assert_eq!(
            request.handle_response_payload(&[0u8; 48]).unwrap_err(),
            PairingError::RequestClosed
        );
    }

    #[test]
    fn persist_round_trips_pending_state() {
        let request = CandidateRequest::new(&invite_bytes(), b"hello world").unwrap();
        let restored = CandidateRequest::from_persisted(&request.persist()).unwrap();

        assert_eq!(restored.state(), CandidateState::Pending);
        assert_eq!(restored.encode(), request.encode());
        assert_eq!(restored.request_id(), request.request_id());
    }

    #[test]
    fn persisted_completed_attempt_restores_terminal() {
        let mut request = CandidateRequest::new(&invite_bytes(), b"hello").unwrap();
        // Simulate completion by persisting with a cached key
        request.key = Some(PROTECTED_KEY);
        request.state = CandidateState::Accepted;
        request.clear_secrets();

        let restored = CandidateRequest::from_persisted(&request.persist()).unwrap();
        assert_eq!(restored.state(), CandidateState::Accepted);
        assert_eq!(restored.key(), Some(&PROTECTED_KEY));
        assert!(restored.session().is_none());
    }

    #[test]
    fn debug_omits_secrets() {
        let request = CandidateRequest::new(&invite_bytes(), b"hello").unwrap();
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("session"));
        assert!(!rendered.contains("seed"));
    }
}
