//! Caller-chosen document ids.
//!
//! A custom id becomes the seed of the document id, so storing twice under
//! the same custom id and owner overwrites the earlier document.

use crate::error::{DocumentError, DocumentResult};
use std::fmt;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 50;

/// Alphanumeric id of 3 to 50 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomDocumentId(String);

impl CustomDocumentId {
    pub fn parse(id: &str) -> DocumentResult<Self> {
        let valid_len = (MIN_LEN..=MAX_LEN).contains(&id.len());
        if !valid_len || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DocumentError::InvalidCustomId(format!(
                "'{id}' must be {MIN_LEN}-{MAX_LEN} alphanumeric characters"
            )));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomDocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
