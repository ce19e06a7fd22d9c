//! Authenticated envelopes for both message directions.
//!
//! The request direction wraps the candidate's signed user data in an AEAD
//! envelope keyed by the invite public key: anyone holding the invite can
//! open it, but nobody can tamper with it or graft it onto a different
//! invite. The response direction is keyed through the session-key layer,
//! so it can only be opened by the party that built (or legitimately
//! opened) the request.
//!
//! # Security
//!
//! - The signature covers the encoded `(session, user_data)` pair under a
//!   fixed domain prefix, binding the payload to this exact invite instance
//!   and attempt.
//! - `open_auth` re-encodes its verified result into a self-contained
//!   receipt rather than handing back raw decrypted bytes, so the proof can
//!   be re-verified later without repeating decryption.
//! - Secrecy of user data against non-holders of the invite is a courtesy;
//!   the security boundary is possession of the invite seed.

use blindpair_crypto as crypto;
use blindpair_proto::{AuthData, InviteData, InviteReceipt, RequestPayload};
use bytes::Bytes;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

use crate::error::{PairingError, Result};

/// A request envelope successfully opened and verified by a member.
#[derive(Debug, Clone)]
pub struct OpenedAuth {
    /// Session token recovered from the request.
    pub session: [u8; 32],
    /// The candidate's verified user data.
    pub user_data: Bytes,
    /// Signature over the auth data, as carried in the envelope.
    pub signature: [u8; 64],
    /// Encoded [`InviteReceipt`], independently re-verifiable via
    /// [`verify_receipt`].
    pub receipt: Bytes,
}

/// Build the domain-prefixed message the candidate signs.
fn signed_message(auth: &AuthData) -> Vec<u8> {
    let mut message =
        Vec::with_capacity(crypto::SIGNATURE_NAMESPACE.len() + auth.encoded_len());
    message.extend_from_slice(crypto::SIGNATURE_NAMESPACE);
    auth.encode_into(&mut message);
    message
}

fn verify_auth(auth: &AuthData, signature: &[u8; 64], public_key: &[u8; 32]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    verifying_key.verify(&signed_message(auth), &Signature::from_bytes(signature)).is_ok()
}

/// Create the candidate's auth envelope.
///
/// Signs the encoded `(session, user_data)` pair with the invite keypair,
/// then seals signature and user data under the invite-public encryption
/// layer.
pub fn create_auth(user_data: &[u8], keypair: &SigningKey, session: &[u8; 32]) -> RequestPayload {
    let public_key = keypair.verifying_key().to_bytes();

    let auth = AuthData {
        session: Bytes::copy_from_slice(session),
        user_data: Bytes::copy_from_slice(user_data),
    };
    let signature = keypair.sign(&signed_message(&auth)).to_bytes();

    let plaintext = InviteData { signature, user_data: auth.user_data.clone() }.encode();
    let key = Zeroizing::new(crypto::derive_key(&public_key));
    let nonce = crypto::derive_nonce(&public_key, session);
    let data = crypto::seal(&plaintext, &key, &nonce);

    RequestPayload { session: auth.session, data: Bytes::from(data) }
}

/// Open and verify a candidate's auth envelope.
///
/// # Errors
///
/// - [`PairingError::Decryption`] if the AEAD rejects the payload (wrong
///   invite key, tampering, or a malformed session token)
/// - [`PairingError::Malformed`] if the authenticated plaintext fails to
///   decode
/// - [`PairingError::InvalidSignature`] if the signature does not verify
///   under the supplied public key
pub fn open_auth(payload: &RequestPayload, invite_public_key: &[u8; 32]) -> Result<OpenedAuth> {
    // A session of the wrong size cannot derive a nonce; fail the same way
    // a wrong key would.
    let session: [u8; 32] =
        payload.session.as_ref().try_into().map_err(|_| PairingError::Decryption)?;

    let key = Zeroizing::new(crypto::derive_key(invite_public_key));
    let nonce = crypto::derive_nonce(invite_public_key, &session);
    let plaintext = Zeroizing::new(crypto::open(&payload.data, &key, &nonce)?);

    let invite_data = InviteData::decode(&plaintext)?;
    let auth =
        AuthData { session: payload.session.clone(), user_data: invite_data.user_data.clone() };
    if !verify_auth(&auth, &invite_data.signature, invite_public_key) {
        return Err(PairingError::InvalidSignature);
    }

    let receipt = InviteReceipt {
        session,
        signature: invite_data.signature,
        user_data: invite_data.user_data.clone(),
    }
    .encode();

    Ok(OpenedAuth {
        session,
        user_data: invite_data.user_data,
        signature: invite_data.signature,
        receipt,
    })
}

/// Seal a response plaintext under the session-key layer.
pub fn create_reply(plaintext: &[u8], session: &[u8; 32], invite_public_key: &[u8; 32]) -> Vec<u8> {
    let session_key = Zeroizing::new(crypto::derive_session_key(invite_public_key, session));
    let key = Zeroizing::new(crypto::derive_key(&session_key));
    let nonce = crypto::derive_nonce(&session_key, session);
    crypto::seal(plaintext, &key, &nonce)
}

/// Open a response sealed with [`create_reply`].
///
/// # Errors
///
/// - [`PairingError::Decryption`] on any AEAD failure
pub fn open_reply(data: &[u8], session: &[u8; 32], invite_public_key: &[u8; 32]) -> Result<Vec<u8>> {
    let session_key = Zeroizing::new(crypto::derive_session_key(invite_public_key, session));
    let key = Zeroizing::new(crypto::derive_key(&session_key));
    let nonce = crypto::derive_nonce(&session_key, session);
    Ok(crypto::open(data, &key, &nonce)?)
}

/// Re-verify an encoded receipt against an invite public key.
///
/// Pure: re-derives the signed message from the receipt's session and user
/// data and checks the signature. Any decode failure, invalid key bytes or
/// signature mismatch returns false.
pub fn verify_receipt(receipt: &[u8], invite_public_key: &[u8; 32]) -> bool {
    let Ok(receipt) = InviteReceipt::decode(receipt) else {
        return false;
    };
    let auth = AuthData {
        session: Bytes::copy_from_slice(&receipt.session),
        user_data: receipt.user_data.clone(),
    };
    verify_auth(&auth, &receipt.signature, invite_public_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> SigningKey {
        SigningKey::from_bytes(&[0x07; 32])
    }

    const SESSION: [u8; 32] = [0x19; 32];

    #[test]
    fn auth_round_trip() {
        let keypair = keypair();
        let public_key = keypair.verifying_key().to_bytes();

        let payload = create_auth(b"hello world", &keypair, &SESSION);
        let opened = open_auth(&payload, &public_key).unwrap();

        assert_eq!(opened.session, SESSION);
        assert_eq!(opened.user_data.as_ref(), b"hello world");
    }

    #[test]
    fn auth_is_deterministic() {
        let keypair = keypair();
        let a = create_auth(b"hello", &keypair, &SESSION);
        let b = create_auth(b"hello", &keypair, &SESSION);
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_public_key_cannot_open() {
        let keypair = keypair();
        let payload = create_auth(b"hello", &keypair, &SESSION);

        let wrong = SigningKey::from_bytes(&[0x08; 32]).verifying_key().to_bytes();
        assert_eq!(open_auth(&payload, &wrong).unwrap_err(), PairingError::Decryption);
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let keypair = keypair();
        let public_key = keypair.verifying_key().to_bytes();

        let mut payload = create_auth(b"hello", &keypair, &SESSION);
        let mut data = payload.data.to_vec();
        data[0] ^= 0x01;
        payload.data = Bytes::from(data);

        assert_eq!(open_auth(&payload, &public_key).unwrap_err(), PairingError::Decryption);
    }

    #[test]
    fn swapped_session_fails() {
        // The nonce binds the ciphertext to its session; replaying the
        // ciphertext under another session token must fail.
        let keypair = keypair();
        let public_key = keypair.verifying_key().to_bytes();

        let mut payload = create_auth(b"hello", &keypair, &SESSION);
        payload.session = Bytes::copy_from_slice(&[0x20; 32]);

        assert_eq!(open_auth(&payload, &public_key).unwrap_err(), PairingError::Decryption);
    }

    #[test]
    fn odd_sized_session_fails_like_garbage() {
        let keypair = keypair();
        let public_key = keypair.verifying_key().to_bytes();

        let mut payload = create_auth(b"hello", &keypair, &SESSION);
        payload.session = Bytes::from_static(b"short");

        assert_eq!(open_auth(&payload, &public_key).unwrap_err(), PairingError::Decryption);
    }

    #[test]
    fn reply_round_trip() {
        let public_key = keypair().verifying_key().to_bytes();
        let sealed = create_reply(b"granted", &SESSION, &public_key);
        assert_eq!(open_reply(&sealed, &SESSION, &public_key).unwrap(), b"granted");
    }

    #[test]
    fn reply_unrecoverable_without_session() {
        let public_key = keypair().verifying_key().to_bytes();
        let sealed = create_reply(b"granted", &SESSION, &public_key);

        let wrong_session = [0x1a; 32];
        assert_eq!(
            open_reply(&sealed, &wrong_session, &public_key),
            Err(PairingError::Decryption)
        );
    }

    #[test]
    fn receipt_verifies_and_detects_tampering() {
        let keypair = keypair();
        let public_key = keypair.verifying_key().to_bytes();

        let payload = create_auth(b"hello world", &keypair, &SESSION);
        let opened = open_auth(&payload, &public_key).unwrap();

        assert!(verify_receipt(&opened.receipt, &public_key));

        // Any flipped byte invalidates the receipt
        for i in 0..opened.receipt.len() {
            let mut tampered = opened.receipt.to_vec();
            tampered[i] ^= 0x01;
            assert!(!verify_receipt(&tampered, &public_key), "byte {i} tamper went undetected");
        }
    }

    #[test]
    fn receipt_does_not_verify_under_other_key() {
        let keypair = keypair();
        let public_key = keypair.verifying_key().to_bytes();

        let payload = create_auth(b"hello world", &keypair, &SESSION);
        let opened = open_auth(&payload, &public_key).unwrap();

        let other = SigningKey::from_bytes(&[0x08; 32]).verifying_key().to_bytes();
        assert!(!verify_receipt(&opened.receipt, &other));
    }

    #[test]
    fn garbage_receipt_is_false_not_panic() {
        let public_key = keypair().verifying_key().to_bytes();
        assert!(!verify_receipt(b"", &public_key));
        assert!(!verify_receipt(&[0xff; 7], &public_key));
    }
}
