//! Blindpair Handshake Engine
//!
//! A two-party pairing handshake: an out-of-band invite lets a joining
//! *candidate* prove possession of the invite seed and obtain a *member's*
//! protected key, without a trusted intermediary and without the member
//! recognizing the candidate in advance.
//!
//! # Flow
//!
//! ```text
//! member                                candidate
//!   │  create_invite(protected_key)        │
//!   │ ───────── invite (out of band) ────> │
//!   │                                      │ CandidateRequest::new
//!   │ <──────── InviteRequest ──────────── │
//!   │ MemberRequest::open(public_key)      │
//!   │ confirm / deny                       │
//!   │ ───────── InviteResponse ──────────> │
//!   │                                      │ handle_response → key
//! ```
//!
//! Both directions are authenticated-encrypted and session-scoped; a
//! granted key is verified against the invite's discovery key before the
//! candidate accepts it.
//!
//! # Security
//!
//! - Possession of the invite seed is the capability. Requests are signed
//!   with the seed-derived one-time keypair and sealed so they cannot be
//!   tampered with or moved to another invite.
//! - A member only learns a request's contents by supplying the correct
//!   invite public key; wrong keys fail uniformly with no oracle.
//! - Responses can only be opened by the candidate that built the request
//!   (session-key layer), and an accepted key must hash to the expected
//!   discovery key - a forged, unrelated key is rejected.
//! - Replays are inert: duplicate responses after a terminal transition
//!   are no-ops or explicit errors, never a second outcome.
//!
//! The core is synchronous and I/O-free. Transport, persistence and retry
//! policy live outside; [`Pairing`] is the explicit registry glue between
//! them and the two state machines.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod candidate;
pub mod envelope;
pub mod error;
pub mod invite;
pub mod member;
pub mod pairing;

pub use candidate::{CandidateRequest, CandidateState, PairingDetails};
pub use envelope::{OpenedAuth, create_auth, create_reply, open_auth, open_reply, verify_receipt};
pub use error::{PairingError, Result};
pub use invite::{CreatedInvite, InviteOptions, create_invite, create_invite_with_seed, decode_invite};
pub use member::{GrantOptions, MemberRequest, MemberState};
pub use pairing::{InboundRequest, Pairing};

// Wire types surface directly in this API
pub use blindpair_proto::{FastForwardTo, Invite, ResponseStatus};
