//! In-memory storage backend.
//!
//! Entries live in a shared map guarded by an async `RwLock`; clones share
//! the same underlying data. Expiry is recorded but never enforced.

use crate::error::StorageResult;
use crate::types::{StorageKey, StorageValue};
use crate::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

struct Entry {
    value: StorageValue,
    expires_at: Option<DateTime<Utc>>,
}

/// Thread-safe in-memory [`Storage`].
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<RwLock<HashMap<StorageKey, Entry>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the advisory expiry recorded for `key`, if any.
    pub async fn expires_at(&self, key: &StorageKey) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .await
            .get(key)
            .and_then(|entry| entry.expires_at)
    }

    /// Returns all stored keys.
    pub async fn keys(&self) -> Vec<StorageKey> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Overwrites the value under an existing key without touching expiry.
    ///
    /// Returns false if the key is absent.
    pub async fn replace_value(&self, key: &StorageKey, value: StorageValue) -> bool {
        match self.entries.write().await.get_mut(key) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: &StorageKey) -> StorageResult<Option<StorageValue>> {
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.value.clone()))
    }

    async fn put(
        &self,
        key: &StorageKey,
        value: &StorageValue,
        expires_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()> {
        trace!("storing {} bytes in memory", value.len());
        self.entries.write().await.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> StorageResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn ready(&self) -> StorageResult<()> {
        Ok(())
    }
}
