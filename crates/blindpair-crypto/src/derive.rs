//! Domain-separated key derivation.
//!
//! Every secondary value in the handshake - routing ids, tokens, AEAD keys
//! and nonces - comes out of one primitive: HKDF-SHA256 over the
//! concatenated inputs, with a distinct ASCII namespace label per purpose as
//! the `info` parameter. Distinct labels guarantee that two derivations can
//! never collide across purposes even when fed identical inputs.
//!
//! # Security
//!
//! - Determinism: every function here is a pure function of its inputs.
//!   Randomness, where the protocol needs it, is injected by callers above
//!   this layer.
//! - Nonce uniqueness: [`derive_nonce`] is deterministic per (key material,
//!   session) pair. AEAD key/nonce reuse is catastrophic, so session tokens
//!   must be unique per attempt - which they are, being either random or
//!   derived from the attempt's own user data.
//! - The response direction is keyed by [`derive_session_key`], which mixes
//!   in the session token: without first recovering the session from the
//!   request envelope, the reply cannot be decrypted.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

/// AEAD key length (XChaCha20-Poly1305).
pub const KEY_SIZE: usize = 32;

/// AEAD nonce length (XChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 24;

/// Length of derived identifiers (invite id, discovery key, request id).
pub const ID_SIZE: usize = 32;

/// Length of invite seeds and session tokens.
pub const SEED_SIZE: usize = 32;

/// Namespace label for invite ids.
const NS_INVITE_ID: &[u8] = b"blindpairInviteIdV1";

/// Namespace label for discovery keys.
const NS_DISCOVERY_KEY: &[u8] = b"blindpairDiscoveryV1";

/// Namespace label for tokens.
const NS_TOKEN: &[u8] = b"blindpairTokenV1";

/// Namespace label for derived session tokens.
const NS_SESSION: &[u8] = b"blindpairSessionV1";

/// Namespace label for request ids.
const NS_REQUEST_ID: &[u8] = b"blindpairRequestIdV1";

/// Namespace label for AEAD keys.
const NS_ENCRYPT: &[u8] = b"blindpairEncryptV1";

/// Namespace label for AEAD nonces.
const NS_NONCE: &[u8] = b"blindpairNonceV1";

/// Namespace label for the response-direction session key.
const NS_SESSION_KEY: &[u8] = b"blindpairSessionKeyV1";

/// Domain prefix for request signatures.
///
/// Prepended to the signed message so an invite signature can never be
/// replayed as a signature in any other context.
pub const SIGNATURE_NAMESPACE: &[u8] = b"blindpairSignatureV1";

/// One derivation: HKDF-SHA256 over the concatenated inputs, labelled by
/// namespace.
fn derive<const N: usize>(namespace: &'static [u8], inputs: &[&[u8]]) -> [u8; N] {
    let total = inputs.iter().map(|input| input.len()).sum();
    let mut ikm = Zeroizing::new(Vec::with_capacity(total));
    for input in inputs {
        ikm.extend_from_slice(input);
    }

    let hkdf = Hkdf::<Sha256>::new(None, &ikm);
    let mut out = [0u8; N];
    let Ok(()) = hkdf.expand(namespace, &mut out) else {
        unreachable!("{N} bytes is a valid HKDF-SHA256 output length");
    };
    out
}

/// Routing id of an invite, derived from its public key. Not secret.
pub fn invite_id(invite_public_key: &[u8; 32]) -> [u8; ID_SIZE] {
    derive(NS_INVITE_ID, &[invite_public_key])
}

/// Public, non-secret identifier of a protected key.
///
/// Reveals nothing about the key beyond its identity; used so a member can
/// route an incoming request without the key itself ever appearing on the
/// wire.
pub fn discovery_key(protected_key: &[u8; 32]) -> [u8; ID_SIZE] {
    derive(NS_DISCOVERY_KEY, &[protected_key])
}

/// Bind a candidate's user data to an invite's public key.
pub fn derive_token(invite_public_key: &[u8; 32], user_data: &[u8]) -> [u8; SEED_SIZE] {
    derive(NS_TOKEN, &[invite_public_key, user_data])
}

/// Default (deterministic) session token, derived from a token.
///
/// Callers may substitute an externally chosen 32-byte session instead, to
/// correlate an attempt across retries.
pub fn derive_session_token(token: &[u8; 32]) -> [u8; SEED_SIZE] {
    derive(NS_SESSION, &[token])
}

/// Correlation id for a response, derived from the session token.
///
/// Both sides compute it independently: the candidate at construction, the
/// member after opening the request.
pub fn derive_request_id(session: &[u8; 32]) -> [u8; ID_SIZE] {
    derive(NS_REQUEST_ID, &[session])
}

/// AEAD key over the given key material.
///
/// For the request direction the material is the invite public key - the
/// envelope is not secret from invite holders, by design; it only has to
/// resist tampering.
pub fn derive_key(material: &[u8; 32]) -> [u8; KEY_SIZE] {
    derive(NS_ENCRYPT, &[material])
}

/// AEAD nonce over the given key material, scoped by session.
///
/// Deterministic and unique per (material, session) pair; uniqueness rests
/// entirely on session-token uniqueness per attempt.
pub fn derive_nonce(material: &[u8; 32], session: &[u8; 32]) -> [u8; NONCE_SIZE] {
    derive(NS_NONCE, &[material, session])
}

/// Session key for the response direction.
///
/// Mixes the invite public key with the session token, so the reply can
/// only be opened by a party that already recovered the session - that is,
/// by the candidate that built the request.
pub fn derive_session_key(invite_public_key: &[u8; 32], session: &[u8; 32]) -> [u8; KEY_SIZE] {
    derive(NS_SESSION_KEY, &[invite_public_key, session])
}
