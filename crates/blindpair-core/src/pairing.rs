//! Pairing coordinator: explicit owned registries for both roles.
//!
//! The handshake core is stateless between calls; this coordinator is the
//! thin glue that owns the two maps a real deployment needs - joined
//! protected keys by discovery key (member role) and live candidate
//! attempts by correlation id (candidate role) - with a clear lifecycle
//! and no ambient state.
//!
//! Routing discipline: at most one live candidate object exists per
//! attempt, keyed by correlation id, so a duplicate inbound response lands
//! on the same object instead of forking state. Responses for unknown ids
//! are silently ignored (already completed, or never ours).

use std::collections::HashMap;

use blindpair_crypto as crypto;
use blindpair_proto::InviteResponse;

use crate::{
    candidate::{CandidateRequest, PairingDetails},
    error::{PairingError, Result},
    member::MemberRequest,
};

/// An inbound request resolved against a joined protected key.
#[derive(Debug)]
pub struct InboundRequest {
    /// The wrapped, still-unopened request.
    pub request: MemberRequest,
    /// The protected key whose discovery key matched; what `confirm` will
    /// hand over if the member honors the request.
    pub protected_key: [u8; 32],
}

/// Coordinator owning the pairing state for one peer.
///
/// Created at startup, torn down explicitly; dropping it drops every live
/// candidate (which clears their secrets).
#[derive(Debug, Default)]
pub struct Pairing {
    /// Discovery key → joined protected key.
    joined_keys: HashMap<[u8; 32], [u8; 32]>,
    /// Correlation id → live candidate attempt.
    candidates: HashMap<[u8; 32], CandidateRequest>,
}

impl Pairing {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start answering requests for a protected key.
    ///
    /// # Errors
    ///
    /// - [`PairingError::AlreadyJoined`] if the key is already joined
    pub fn join(&mut self, protected_key: [u8; 32]) -> Result<()> {
        let discovery_key = crypto::discovery_key(&protected_key);
        if self.joined_keys.contains_key(&discovery_key) {
            return Err(PairingError::AlreadyJoined);
        }
        self.joined_keys.insert(discovery_key, protected_key);
        Ok(())
    }

    /// Stop answering requests for a protected key.
    ///
    /// # Errors
    ///
    /// - [`PairingError::NotJoined`] if the key was not joined
    pub fn leave(&mut self, protected_key: &[u8; 32]) -> Result<()> {
        let discovery_key = crypto::discovery_key(protected_key);
        if self.joined_keys.remove(&discovery_key).is_none() {
            return Err(PairingError::NotJoined);
        }
        Ok(())
    }

    /// Protected key joined under this discovery key, if any.
    pub fn joined_key(&self, discovery_key: &[u8; 32]) -> Option<&[u8; 32]> {
        self.joined_keys.get(discovery_key)
    }

    /// Begin (or resume) a redemption attempt for an invite.
    ///
    /// If an attempt with the same correlation id is already live, it is
    /// returned instead of creating a divergent duplicate.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Malformed`] / [`PairingError::MissingDiscoveryKey`]
    ///   from candidate construction
    pub fn pair(&mut self, invite: &[u8], user_data: &[u8]) -> Result<&mut CandidateRequest> {
        let request = CandidateRequest::new(invite, user_data)?;
        let request_id = *request.request_id();
        Ok(self.candidates.entry(request_id).or_insert(request))
    }

    /// Route an inbound request using its transport-level discovery key.
    ///
    /// The discovery key never travels inside the message; the transport
    /// that delivered the request knows which topic it arrived on and
    /// supplies it here. Returns `None` when the key is not joined.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Malformed`] if the request fails to decode
    pub fn handle_request(
        &self,
        discovery_key: &[u8; 32],
        request: &[u8],
    ) -> Result<Option<InboundRequest>> {
        let Some(protected_key) = self.joined_keys.get(discovery_key) else {
            tracing::debug!("pairing request for a discovery key we have not joined");
            return Ok(None);
        };
        Ok(Some(InboundRequest {
            request: MemberRequest::from_bytes(request)?,
            protected_key: *protected_key,
        }))
    }

    /// Route an inbound response to its live candidate.
    ///
    /// Unknown correlation ids are silently ignored (`Ok(None)`): the
    /// attempt either completed earlier or was never ours. A terminal
    /// outcome - acceptance, denial or binding mismatch - removes the
    /// candidate from the registry.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Malformed`] if the response framing fails to
    ///   decode
    /// - any error from
    ///   [`CandidateRequest::handle_response_payload`]
    pub fn handle_response(&mut self, response: &[u8]) -> Result<Option<PairingDetails>> {
        let response = InviteResponse::decode(response)?;
        let Some(candidate) = self.candidates.get_mut(&response.id) else {
            tracing::debug!("pairing response for an unknown request id");
            return Ok(None);
        };

        match candidate.handle_response_payload(&response.payload) {
            Ok(details) => {
                self.candidates.remove(&response.id);
                Ok(Some(details))
            },
            Err(err) => {
                if err.is_terminal() {
                    self.candidates.remove(&response.id);
                }
                Err(err)
            },
        }
    }

    /// Abandon a live attempt, destroying it. Returns false if the id is
    /// unknown.
    pub fn abandon(&mut self, request_id: &[u8; 32]) -> bool {
        match self.candidates.remove(request_id) {
            Some(mut candidate) => {
                candidate.destroy();
                true
            },
            None => false,
        }
    }

    /// Live candidate attempts.
    pub fn requests(&self) -> impl Iterator<Item = &CandidateRequest> {
        self.candidates.values()
    }

    /// Look up a live attempt by correlation id.
    pub fn candidate(&self, request_id: &[u8; 32]) -> Option<&CandidateRequest> {
        self.candidates.get(request_id)
    }
}
