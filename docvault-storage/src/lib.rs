//! Storage port for docvault.
//!
//! The document service only ever sees the [`Storage`] trait: an async
//! key/value interface over opaque UTF-8 strings. Keys are already
//! encrypted by the time they reach this layer, so backends never learn
//! which owner or document an entry belongs to.
//!
//! Backends:
//! - [`InMemoryStorage`] for tests and local runs
//! - [`S3Storage`] for S3-compatible object stores (AWS, MinIO)

pub mod config;
pub mod error;
pub mod memory;
pub mod s3;
mod types;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStorage;
pub use s3::S3Storage;
pub use types::{StorageKey, StorageValue};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Key/value persistence consumed by the document service.
///
/// Implementations must be safe to call concurrently. No ordering is
/// guaranteed between unrelated keys.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &StorageKey) -> StorageResult<Option<StorageValue>>;

    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// `expires_at` is advisory metadata for the backend's lifecycle rules;
    /// it is not enforced here.
    async fn put(
        &self,
        key: &StorageKey,
        value: &StorageValue,
        expires_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()>;

    /// Removes the entry under `key`. Returns whether one existed.
    async fn delete(&self, key: &StorageKey) -> StorageResult<bool>;

    /// Fails if the backend cannot currently serve requests.
    async fn ready(&self) -> StorageResult<()>;
}
