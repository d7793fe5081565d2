//! Document service error types.

use docvault_crypto::{CryptoError, KeyId};
use docvault_storage::StorageError;
use thiserror::Error;

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors surfaced by the document service.
///
/// A missing document, or one requested with the wrong owner, is not an
/// error: fetch returns `Ok(None)` and delete returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Positive virus scan result. Not retried.
    #[error("document contains a virus")]
    Infected,

    /// The document id names a key id with no configured passphrase.
    #[error("not configured to decrypt content with key id {0}")]
    UnknownKey(KeyId),

    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("invalid custom document id: {0}")]
    InvalidCustomId(String),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("crypto error: {0}")]
    Crypto(#[source] CryptoError),

    /// An expiry was requested but the bucket applies its own expiration.
    #[error("per-document expiry is not supported: bucket expiration is configured")]
    ExpiryNotSupported,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<CryptoError> for DocumentError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::UnknownKey(key_id) => DocumentError::UnknownKey(key_id),
            CryptoError::InvalidDocumentId(msg) => DocumentError::InvalidDocumentId(msg),
            other => DocumentError::Crypto(other),
        }
    }
}
