//! Blindpair Cryptographic Primitives
//!
//! Key derivation and authenticated encryption for the invite handshake.
//! Pure functions with deterministic outputs; randomness is injected by
//! callers above this layer, which keeps every operation reproducible in
//! tests.
//!
//! # Key hierarchy
//!
//! All secondary material flows from two roots - the invite seed (via the
//! one-time invite keypair) and the protected key:
//!
//! ```text
//! invite public key ──┬─> invite id                 (routing)
//!                     ├─> AEAD key / nonce          (request envelope)
//!                     └─┬─> session key             (with session token)
//!                       └─> AEAD key / nonce        (response envelope)
//! protected key ───────> discovery key              (routing + binding)
//! ```
//!
//! Each arrow is one HKDF-SHA256 derivation under its own namespace label,
//! so no value can be confused for another even across protocol revisions.
//!
//! # Security
//!
//! - The request envelope is keyed solely by the invite public key: it is
//!   readable by anyone holding the invite, by design. Its job is tamper
//!   resistance and binding, not secrecy.
//! - The response envelope is keyed through the session token recovered
//!   from a valid request, so only the requesting candidate can open it.
//! - AEAD failures surface as a single undifferentiated error; no oracle.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod derive;
pub mod error;

pub use aead::{TAG_SIZE, open, seal};
pub use derive::{
    ID_SIZE, KEY_SIZE, NONCE_SIZE, SEED_SIZE, SIGNATURE_NAMESPACE, derive_key, derive_nonce,
    derive_request_id, derive_session_key, derive_session_token, derive_token, discovery_key,
    invite_id,
};
pub use error::CryptoError;
