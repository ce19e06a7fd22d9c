//! Authenticated encryption using `XChaCha20-Poly1305`
//!
//! Thin seal/open helpers over the AEAD. Keys and nonces always come from
//! [`crate::derive`]; nothing here generates or stores key material.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use crate::{
    derive::{KEY_SIZE, NONCE_SIZE},
    error::CryptoError,
};

/// Poly1305 tag size appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

/// Seal `plaintext` under a derived key/nonce pair.
///
/// The ciphertext is `plaintext.len() + TAG_SIZE` bytes.
///
/// # Security
///
/// The nonce is derived deterministically per session; callers must never
/// seal two different plaintexts under the same (key, nonce) pair. The
/// handshake upholds this by sealing exactly one message per direction per
/// session.
pub fn seal(plaintext: &[u8], key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };
    ciphertext
}

/// Open a sealed payload.
///
/// # Errors
///
/// - [`CryptoError::DecryptionFailed`] for any failure - wrong key, wrong
///   nonce, truncation or tampering are indistinguishable by design.
pub fn open(
    ciphertext: &[u8],
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x41; KEY_SIZE];
    const NONCE: [u8; NONCE_SIZE] = [0x42; NONCE_SIZE];

    #[test]
    fn seal_open_round_trip() {
        let sealed = seal(b"hello world", &KEY, &NONCE);
        assert_eq!(open(&sealed, &KEY, &NONCE).unwrap(), b"hello world");
    }

    #[test]
    fn ciphertext_length() {
        let sealed = seal(b"hello", &KEY, &NONCE);
        assert_eq!(sealed.len(), 5 + TAG_SIZE);

        let sealed = seal(b"", &KEY, &NONCE);
        assert_eq!(sealed.len(), TAG_SIZE);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(b"secret", &KEY, &NONCE);
        let wrong = [0x43; KEY_SIZE];
        assert_eq!(open(&sealed, &wrong, &NONCE), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn wrong_nonce_fails() {
        let sealed = seal(b"secret", &KEY, &NONCE);
        let wrong = [0x44; NONCE_SIZE];
        assert_eq!(open(&sealed, &KEY, &wrong), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn every_flipped_bit_is_detected() {
        let sealed = seal(b"hi", &KEY, &NONCE);
        for i in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                open(&tampered, &KEY, &NONCE),
                Err(CryptoError::DecryptionFailed),
                "flipped bit at byte {i} went undetected"
            );
        }
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let sealed = seal(b"hello", &KEY, &NONCE);
        assert_eq!(open(&sealed[..TAG_SIZE - 1], &KEY, &NONCE), Err(CryptoError::DecryptionFailed));
        assert_eq!(open(&[], &KEY, &NONCE), Err(CryptoError::DecryptionFailed));
    }
}
