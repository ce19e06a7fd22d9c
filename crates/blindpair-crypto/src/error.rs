//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from AEAD operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Authentication failed while opening a sealed payload.
    ///
    /// Deliberately carries no detail: a wrong key, a wrong nonce and a
    /// tampered ciphertext are indistinguishable by construction, so a
    /// caller cannot be turned into a decryption oracle.
    #[error("decryption failed")]
    DecryptionFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(CryptoError::DecryptionFailed.to_string(), "decryption failed");
    }
}
