//! Shared fixtures for document service tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docvault_crypto::{KeyId, KeyRing};
use docvault_service::{Document, DocumentService, ScanResult, VirusScanner};
use docvault_storage::InMemoryStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PASSPHRASES: [(u32, &str); 3] = [(1, "pw1"), (2, "pw2"), (3, "pw3")];

/// Ring with `active` as encryption key and `known` as decryption keys.
pub fn ring(active: u32, known: &[u32]) -> Arc<KeyRing> {
    let keys = PASSPHRASES
        .iter()
        .filter(|(id, _)| known.contains(id))
        .map(|(id, pw)| (KeyId(*id), *pw));
    Arc::new(KeyRing::new(KeyId(active), keys).unwrap())
}

pub fn service(ring: Arc<KeyRing>, storage: &InMemoryStorage) -> DocumentService {
    DocumentService::new(ring, Arc::new(storage.clone()))
}

pub fn pdf() -> Document {
    Document::new("A", vec![1, 2, 3], "application/pdf")
}

/// Scanner returning a fixed verdict and counting calls.
pub struct StubScanner {
    verdict: ScanResult,
    calls: AtomicUsize,
}

impl StubScanner {
    pub fn new(verdict: ScanResult) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VirusScanner for StubScanner {
    async fn scan(&self, _content: &[u8]) -> ScanResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}
