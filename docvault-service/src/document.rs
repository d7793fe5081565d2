//! Document payload and its serialized form.
//!
//! Serialized as JSON `{"title", "content", "content_type"}` with the
//! content as standard base64. `contentType` is accepted on read.

use crate::error::DocumentResult;
use serde::{Deserialize, Serialize};

/// A stored document. Plaintext only exists in memory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    #[serde(with = "base64_content")]
    pub content: Vec<u8>,
    #[serde(alias = "contentType")]
    pub content_type: String,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }
}

pub(crate) fn serialize(document: &Document) -> DocumentResult<String> {
    Ok(serde_json::to_string(document)?)
}

pub(crate) fn deserialize(serialized: &str) -> DocumentResult<Document> {
    Ok(serde_json::from_str(serialized)?)
}

mod base64_content {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
