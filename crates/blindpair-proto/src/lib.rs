//! Blindpair Wire Protocol
//!
//! Binary encodings for every message the invite handshake puts on the wire
//! or on disk: invites, requests, responses, receipts and persisted
//! candidate state. The codec layer is deliberately dumb - no crypto, no
//! state - so the byte layout can be audited and fuzzed in isolation.
//!
//! # Format
//!
//! Messages are built from four primitives: compact little-endian uints,
//! length-prefixed buffers, and fixed 32-/64-byte fields. Encoding is
//! two-pass (exact size, then write) so every message allocates exactly
//! once. Decoding is strict: truncated input and trailing bytes both fail
//! with typed errors, and length prefixes are validated against the input
//! before anything is copied.
//!
//! # Versioning
//!
//! Only the invite carries a version byte; it gates the whole capability,
//! so an unknown version fails fast with
//! [`WireError::UnknownInviteVersion`]. The other messages evolve through
//! their flag bits instead: unknown bits are ignored on decode.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod messages;
pub mod wire;

pub use errors::{Result, WireError};
pub use messages::{
    AuthData, FastForwardTo, INVITE_VERSION, Invite, InviteData, InviteReceipt, InviteRequest,
    InviteResponse, PersistedRequest, RequestPayload, ResponsePayload, ResponseStatus,
};
