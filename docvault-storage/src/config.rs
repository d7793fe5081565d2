//! Object storage configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection and lifecycle settings for the S3 backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding all documents.
    pub bucket: String,

    /// Signing region.
    pub region: String,

    /// Optional endpoint override (for MinIO or other S3-compatible stores).
    pub endpoint_override: Option<String>,

    pub access_key_id: String,

    pub secret_access_key: String,

    /// Bucket-wide object expiry. When set, per-document expiry from
    /// callers is ignored because the lifecycle rule already governs it.
    pub expiration_in_days: Option<u32>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "docvault".to_string(),
            region: "us-east-1".to_string(),
            endpoint_override: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            expiration_in_days: None,
        }
    }
}

impl StorageConfig {
    /// Whether a positive bucket-wide expiration is configured.
    pub fn lifecycle_enabled(&self) -> bool {
        matches!(self.expiration_in_days, Some(days) if days > 0)
    }

    /// Whether callers may set per-document expiry.
    pub fn supports_request_expiry(&self) -> bool {
        self.expiration_in_days.is_none()
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint_override", &self.endpoint_override)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("expiration_in_days", &self.expiration_in_days)
            .finish()
    }
}
