//! Member-side request state machine.
//!
//! A `MemberRequest` wraps an incoming wire request without trusting any of
//! it: until `open` succeeds with the correct invite public key, nothing is
//! decrypted and no user data exists. Opening is the enforcement point for
//! "no leakage to unproven inviters" - it only succeeds if the caller
//! already holds the right key, and a wrong key yields one uniform failure.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────┐  open(pk)  ┌────────┐  confirm   ┌───────────┐
//! │ Unopened │───────────>│ Opened │───────────>│ Confirmed │
//! └──────────┘            └────────┘            └───────────┘
//!      │ deny                  │ deny
//!      ↓                       ↓
//! ┌────────┐              ┌────────┐
//! │ Denied │              │ Denied │
//! └────────┘              └────────┘
//! ```
//!
//! `confirm`/`deny` are idempotent guards, not errors: the first call wins
//! and later calls change nothing, which gives at-most-once response
//! construction under concurrent callers.

use blindpair_crypto as crypto;
use blindpair_proto::{
    FastForwardTo, InviteRequest, InviteResponse, RequestPayload, ResponsePayload, ResponseStatus,
};
use bytes::Bytes;
use zeroize::Zeroize;

use crate::{
    envelope,
    error::{PairingError, Result},
};

/// Lifecycle of a received request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    /// Wrapped but not yet decrypted; nothing in it is trusted.
    Unopened,
    /// Opened and verified; user data and receipt are available.
    Opened,
    /// Response granting the key has been built.
    Confirmed,
    /// Request denied (silently or with a status).
    Denied,
}

/// What a member hands over when confirming a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantOptions {
    /// The protected key the invite was issued for.
    pub key: [u8; 32],
    /// Optional secondary encryption key.
    pub encryption_key: Option<[u8; 32]>,
    /// Optional free-form data for the candidate.
    pub data: Option<Bytes>,
    /// Optional fast-forward hint.
    pub fast_forward_to: Option<FastForwardTo>,
}

/// Verified contents populated by a successful `open`.
struct Opened {
    public_key: [u8; 32],
    /// Cleared once a response has been built (or the request denied).
    session: Option<[u8; 32]>,
    user_data: Bytes,
    receipt: Bytes,
    request_id: [u8; 32],
}

impl Drop for Opened {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.zeroize();
        }
    }
}

/// One received redemption attempt (member side).
pub struct MemberRequest {
    id: [u8; 32],
    payload: RequestPayload,
    state: MemberState,
    opened: Option<Opened>,
    response: Option<Bytes>,
}

impl MemberRequest {
    /// Wrap a raw wire `InviteRequest` without trusting its contents.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Malformed`] if the framing fails to decode
    pub fn from_bytes(request: &[u8]) -> Result<Self> {
        Ok(Self::from_request(InviteRequest::decode(request)?))
    }

    /// Wrap an already-decoded request.
    pub fn from_request(request: InviteRequest) -> Self {
        Self {
            id: request.id,
            payload: request.payload,
            state: MemberState::Unopened,
            opened: None,
            response: None,
        }
    }

    /// Open the request with the invite public key resolved by the caller.
    ///
    /// Idempotent once opened: repeated calls return the cached user data
    /// and do not re-validate the key (calling again with a *different*
    /// key is a caller error, not re-checked).
    ///
    /// # Errors
    ///
    /// - [`PairingError::OpenFailed`] - uniformly, for any underlying
    ///   cause. The request stays unopened and reusable; the default
    ///   guidance on failure is to deny.
    pub fn open(&mut self, invite_public_key: &[u8; 32]) -> Result<&Bytes> {
        if self.opened.is_none() {
            let auth = envelope::open_auth(&self.payload, invite_public_key).map_err(|err| {
                tracing::debug!(error = %err, "failed to open pairing request");
                PairingError::OpenFailed
            })?;
            let request_id = crypto::derive_request_id(&auth.session);
            self.opened = Some(Opened {
                public_key: *invite_public_key,
                session: Some(auth.session),
                user_data: auth.user_data,
                receipt: auth.receipt,
                request_id,
            });
            self.state = MemberState::Opened;
        }

        let Some(opened) = &self.opened else {
            unreachable!("opened was populated above");
        };
        Ok(&opened.user_data)
    }

    /// Grant the request: build the encrypted response carrying the key.
    ///
    /// Valid only once, from `Opened`; anything else is a silent no-op so
    /// concurrent callers cannot construct two different responses.
    pub fn confirm(&mut self, grant: GrantOptions) {
        if self.state != MemberState::Opened {
            return;
        }
        let payload = ResponsePayload::Granted {
            key: grant.key,
            encryption_key: grant.encryption_key,
            data: grant.data,
            fast_forward_to: grant.fast_forward_to,
        };
        if self.build_response(&payload) {
            self.state = MemberState::Confirmed;
        }
    }

    /// Deny the request.
    ///
    /// With a non-zero status on an opened request, an encrypted structured
    /// rejection is built so the candidate can tell "explicitly rejected"
    /// from "never answered". Without a status (or before opening) the
    /// denial is silent: no response bytes exist. No-op once confirmed or
    /// denied.
    pub fn deny(&mut self, status: Option<ResponseStatus>) {
        if matches!(self.state, MemberState::Confirmed | MemberState::Denied) {
            return;
        }
        if let Some(status) = status.filter(|status| !status.is_granted()) {
            self.build_response(&ResponsePayload::Denied { status });
        }
        self.state = MemberState::Denied;
        // A denied request has no further use for its session
        if let Some(opened) = &mut self.opened
            && let Some(mut session) = opened.session.take()
        {
            session.zeroize();
        }
    }

    /// Seal a response payload; clears the session it was sealed under.
    fn build_response(&mut self, payload: &ResponsePayload) -> bool {
        let Some(opened) = &mut self.opened else {
            return false;
        };
        let Some(session) = opened.session.take() else {
            return false;
        };
        let sealed = envelope::create_reply(&payload.encode(), &session, &opened.public_key);
        self.response = Some(
            InviteResponse { id: opened.request_id, payload: Bytes::from(sealed) }.encode(),
        );
        let mut session = session;
        session.zeroize();
        true
    }

    /// Outbound wire response, present after `confirm` or a status-bearing
    /// `deny`.
    pub fn response(&self) -> Option<&Bytes> {
        self.response.as_ref()
    }

    /// Invite id claimed by the request (untrusted routing data).
    pub fn id(&self) -> &[u8; 32] {
        &self.id
    }

    /// Verified user data, once opened.
    pub fn user_data(&self) -> Option<&Bytes> {
        self.opened.as_ref().map(|opened| &opened.user_data)
    }

    /// Session token recovered from the request, until a response clears
    /// it.
    pub fn session(&self) -> Option<&[u8; 32]> {
        self.opened.as_ref().and_then(|opened| opened.session.as_ref())
    }

    /// Self-contained receipt proving what was submitted, once opened.
    pub fn receipt(&self) -> Option<&Bytes> {
        self.opened.as_ref().map(|opened| &opened.receipt)
    }

    /// Correlation id for the response, once opened.
    pub fn request_id(&self) -> Option<&[u8; 32]> {
        self.opened.as_ref().map(|opened| &opened.request_id)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MemberState {
        self.state
    }
}

impl std::fmt::Debug for MemberRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberRequest")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
