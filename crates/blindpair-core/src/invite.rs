//! Invite creation and decoding.
//!
//! An invite is a capability: the seed deterministically derives a one-time
//! Ed25519 keypair, and knowledge of the seed is necessary and sufficient
//! to construct a valid request. Everything below the random seed draw is a
//! pure function, so tests pin seeds and get byte-stable invites.

use blindpair_crypto as crypto;
use blindpair_proto::{Invite, WireError};
use bytes::Bytes;
use ed25519_dalek::SigningKey;
use rand::{RngCore, rngs::OsRng};

/// A freshly created invite, ready for out-of-band distribution.
#[derive(Debug, Clone)]
pub struct CreatedInvite {
    /// Routing id derived from the invite public key.
    pub id: [u8; 32],
    /// Encoded invite bytes to hand to the candidate.
    pub invite: Bytes,
    /// The invite public key; the member needs it later to open requests.
    pub public_key: [u8; 32],
    /// Discovery key of the protected key.
    pub discovery_key: [u8; 32],
}

/// Optional invite metadata.
#[derive(Debug, Clone, Default)]
pub struct InviteOptions {
    /// Advisory expiry as whole seconds since the Unix epoch; enforcement
    /// belongs to the layer distributing the invite, not the handshake.
    pub expires: Option<u32>,
    /// Mark the seed as not-to-be-retained after use.
    pub sensitive: bool,
}

/// Create an invite for a protected key with a fresh random seed.
pub fn create_invite(protected_key: &[u8; 32], opts: &InviteOptions) -> CreatedInvite {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    create_invite_with_seed(protected_key, &seed, opts)
}

/// Deterministic invite construction from an explicit seed.
pub fn create_invite_with_seed(
    protected_key: &[u8; 32],
    seed: &[u8; 32],
    opts: &InviteOptions,
) -> CreatedInvite {
    let public_key = SigningKey::from_bytes(seed).verifying_key().to_bytes();
    let id = crypto::invite_id(&public_key);
    let discovery_key = crypto::discovery_key(protected_key);

    let invite = Invite {
        seed: *seed,
        discovery_key: Some(discovery_key),
        expires: opts.expires,
        sensitive: opts.sensitive,
    }
    .encode();

    CreatedInvite { id, invite, public_key, discovery_key }
}

/// Decode invite bytes.
///
/// # Errors
///
/// - [`WireError::UnknownInviteVersion`] for unrecognized versions
/// - other [`WireError`] variants for malformed bytes
pub fn decode_invite(bytes: &[u8]) -> Result<Invite, WireError> {
    Invite::decode(bytes)
}
