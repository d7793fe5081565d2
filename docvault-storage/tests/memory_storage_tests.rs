//! Behavior of the in-memory backend, including concurrent access.

use chrono::{Duration, Utc};
use docvault_storage::{InMemoryStorage, Storage, StorageKey, StorageValue};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn key(s: &str) -> StorageKey {
    StorageKey::new(s)
}

fn value(s: &str) -> StorageValue {
    StorageValue::new(s)
}

#[tokio::test]
async fn get_missing_returns_none() {
    let storage = InMemoryStorage::new();
    assert!(storage.get(&key("missing")).await.unwrap().is_none());
}

#[tokio::test]
async fn put_then_get() {
    let storage = InMemoryStorage::new();
    storage.put(&key("k"), &value("v"), None).await.unwrap();
    assert_eq!(storage.get(&key("k")).await.unwrap(), Some(value("v")));
}

#[tokio::test]
async fn put_overwrites() {
    let storage = InMemoryStorage::new();
    storage.put(&key("k"), &value("v1"), None).await.unwrap();
    storage.put(&key("k"), &value("v2"), None).await.unwrap();
    assert_eq!(storage.get(&key("k")).await.unwrap(), Some(value("v2")));
    assert_eq!(storage.len().await, 1);
}

#[tokio::test]
async fn delete_reports_existence() {
    let storage = InMemoryStorage::new();
    storage.put(&key("k"), &value("v"), None).await.unwrap();

    assert!(storage.delete(&key("k")).await.unwrap());
    assert!(!storage.delete(&key("k")).await.unwrap());
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn expiry_is_recorded_not_enforced() {
    let storage = InMemoryStorage::new();
    let past = Utc::now() - Duration::days(1);
    storage.put(&key("k"), &value("v"), Some(past)).await.unwrap();

    assert_eq!(storage.expires_at(&key("k")).await, Some(past));
    assert!(storage.get(&key("k")).await.unwrap().is_some());
}

#[tokio::test]
async fn ready_is_ok() {
    assert!(InMemoryStorage::new().ready().await.is_ok());
}

#[tokio::test]
async fn clones_share_entries() {
    let a = InMemoryStorage::new();
    let b = a.clone();
    a.put(&key("k"), &value("v"), None).await.unwrap();
    assert_eq!(b.get(&key("k")).await.unwrap(), Some(value("v")));
}

#[tokio::test]
async fn usable_as_trait_object() {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    storage.put(&key("k"), &value("v"), None).await.unwrap();
    assert!(storage.get(&key("k")).await.unwrap().is_some());
}

#[tokio::test]
async fn concurrent_writers_on_distinct_keys() {
    let storage = InMemoryStorage::new();
    let mut handles = Vec::new();
    for i in 0..50 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let k = StorageKey::new(format!("key-{i}"));
            storage
                .put(&k, &StorageValue::new(format!("value-{i}")), None)
                .await
                .unwrap();
            storage.get(&k).await.unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let got = handle.await.unwrap();
        assert_eq!(got, Some(StorageValue::new(format!("value-{i}"))));
    }
    assert_eq!(storage.len().await, 50);
}
