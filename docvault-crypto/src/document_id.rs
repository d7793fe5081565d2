//! Self-describing document identifiers.
//!
//! A document id is an unsigned JWT without its trailing signature segment:
//! `base64url(header).base64url(claims)`. The header carries the key id
//! (`kid`) the document was encrypted under, the claims carry the seed
//! (`jti`). Parsing needs no secrets. The format is stable: ids issued by
//! earlier releases must keep resolving.

use crate::error::{CryptoError, CryptoResult};
use crate::types::KeyId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque document identifier handed to callers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps a caller-supplied id string. No validation happens until it is parsed.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the key id this document was encrypted under.
    pub fn key_id(&self) -> CryptoResult<KeyId> {
        let header = decode_segment::<Header>(self.segment(0)?)?;
        header
            .kid
            .ok_or_else(|| CryptoError::InvalidDocumentId("missing key id".to_string()))?
            .parse::<KeyId>()
            .map_err(|e| CryptoError::InvalidDocumentId(format!("key id is not an integer: {e}")))
    }

    /// Extracts the seed the id was generated from.
    pub fn seed(&self) -> CryptoResult<String> {
        let claims = decode_segment::<Claims>(self.segment(1)?)?;
        claims
            .jti
            .ok_or_else(|| CryptoError::InvalidDocumentId("missing token id".to_string()))
    }

    fn segment(&self, index: usize) -> CryptoResult<&str> {
        let trimmed = self.0.strip_suffix('.').unwrap_or(&self.0);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 2 {
            return Err(CryptoError::InvalidDocumentId(format!(
                "expected 2 segments, found {}",
                parts.len()
            )));
        }
        Ok(parts[index])
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Field order is part of the id format: seeded ids must encode to the
/// same bytes in every release.
#[derive(Serialize, Deserialize)]
struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(default)]
    typ: String,
    #[serde(default)]
    alg: String,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
}

/// Encodes `seed` under `key_id`.
pub fn encode(key_id: KeyId, seed: &str) -> CryptoResult<DocumentId> {
    let header = Header {
        kid: Some(key_id.to_string()),
        typ: "JWT".to_string(),
        alg: "none".to_string(),
    };
    let claims = Claims {
        jti: Some(seed.to_string()),
    };

    let header_json = serde_json::to_vec(&header)
        .map_err(|e| CryptoError::InvalidDocumentId(format!("header encoding failed: {e}")))?;
    let claims_json = serde_json::to_vec(&claims)
        .map_err(|e| CryptoError::InvalidDocumentId(format!("claims encoding failed: {e}")))?;

    Ok(DocumentId(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    )))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> CryptoResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| CryptoError::InvalidDocumentId(format!("segment is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CryptoError::InvalidDocumentId(format!("segment is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_key_id_and_seed() {
        let id = encode(KeyId(3), "abc").unwrap();
        assert_eq!(id.key_id().unwrap(), KeyId(3));
        assert_eq!(id.seed().unwrap(), "abc");
    }

    #[test]
    fn has_no_signature_segment() {
        let id = encode(KeyId(1), "seed").unwrap();
        assert_eq!(id.as_str().matches('.').count(), 1);
        assert!(!id.as_str().ends_with('.'));
    }

    #[test]
    fn trailing_dot_is_tolerated() {
        let id = encode(KeyId(9), "seed").unwrap();
        let dotted = DocumentId::new(format!("{id}."));
        assert_eq!(dotted.key_id().unwrap(), KeyId(9));
    }

    #[test]
    fn header_is_json_with_kid() {
        let id = encode(KeyId(42), "seed").unwrap();
        let header = id.as_str().split('.').next().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();
        assert_eq!(json["kid"], "42");
        assert_eq!(json["alg"], "none");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            DocumentId::new("not-a-token").key_id(),
            Err(CryptoError::InvalidDocumentId(_))
        ));
        assert!(matches!(
            DocumentId::new("a.b.c.d").key_id(),
            Err(CryptoError::InvalidDocumentId(_))
        ));
        assert!(matches!(
            DocumentId::new("!!!.???").key_id(),
            Err(CryptoError::InvalidDocumentId(_))
        ));
    }

    #[test]
    fn missing_kid_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"jti":"x"}"#);
        let id = DocumentId::new(format!("{header}.{claims}"));
        assert!(matches!(id.key_id(), Err(CryptoError::InvalidDocumentId(_))));
    }

    #[test]
    fn non_numeric_kid_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT","kid":"abc"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"jti":"x"}"#);
        let id = DocumentId::new(format!("{header}.{claims}"));
        assert!(matches!(id.key_id(), Err(CryptoError::InvalidDocumentId(_))));
    }
}
