//! Crypto error types.

use crate::types::KeyId;
use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while deriving keys, encrypting or decrypting.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Missing or inconsistent key material. Fatal at startup.
    #[error("invalid crypto configuration: {0}")]
    Configuration(String),

    /// Low-level cipher failure: bad key, tag mismatch or malformed ciphertext.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// Decryption requested for a key id that has no configured passphrase.
    #[error("no passphrase configured for key id {0}")]
    UnknownKey(KeyId),

    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("invalid IV length: {actual} bytes (supported 1..={max})")]
    InvalidIvLength { actual: usize, max: usize },
}
