//! Shared helpers for integration tests against a local MinIO.

use docvault_storage::{StorageConfig, StorageKey};
use uuid::Uuid;

/// Config pointing at local MinIO (`docker run -p 9000:9000 minio/minio server /data`).
pub fn minio_config() -> StorageConfig {
    StorageConfig {
        bucket: "docvault-test".into(),
        region: "us-east-1".into(),
        endpoint_override: Some("http://localhost:9000".into()),
        access_key_id: "minioadmin".into(),
        secret_access_key: "minioadmin".into(),
        expiration_in_days: None,
    }
}

/// Per-test unique key to prevent collisions.
pub fn unique_key() -> StorageKey {
    StorageKey::new(format!("test-runs/{}", Uuid::new_v4()))
}
