//! Document service.
//!
//! Store, fetch and delete encrypted documents scoped to an owner. Nothing
//! records where a document lives: the storage key is the encryption of
//! `"<owner>-<documentId>"` under the document's key id with the owner as
//! IV, recomputed on every call.

use crate::config::ServiceConfig;
use crate::content_type::{self, ContentType};
use crate::custom_id::CustomDocumentId;
use crate::document::{self, Document};
use crate::error::{DocumentError, DocumentResult};
use crate::virus_scan::{self, ClamAvScanner, VirusScanner};
use chrono::{DateTime, Utc};
use docvault_crypto::{document_id, DocumentId, KeyId, KeyRing, Owner};
use docvault_storage::{Storage, StorageConfig, StorageKey, StorageValue};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Stateless facade over the key ring, storage and virus scanner.
///
/// Cheap to clone; clones share collaborators.
#[derive(Clone)]
pub struct DocumentService {
    key_ring: Arc<KeyRing>,
    storage: Arc<dyn Storage>,
    virus_scanner: Option<Arc<dyn VirusScanner>>,
    validate_content_types: bool,
    request_expiry_supported: bool,
}

/// Builder for [`DocumentService`].
pub struct DocumentServiceBuilder {
    key_ring: Arc<KeyRing>,
    storage: Arc<dyn Storage>,
    virus_scanner: Option<Arc<dyn VirusScanner>>,
    validate_content_types: bool,
    request_expiry_supported: bool,
}

impl DocumentServiceBuilder {
    pub fn virus_scanner(mut self, scanner: Arc<dyn VirusScanner>) -> Self {
        self.virus_scanner = Some(scanner);
        self
    }

    pub fn validate_content_types(mut self, enabled: bool) -> Self {
        self.validate_content_types = enabled;
        self
    }

    /// Whether callers may pass `expires_at`. When false, a requested expiry
    /// is rejected with [`DocumentError::ExpiryNotSupported`].
    pub fn request_expiry_supported(mut self, supported: bool) -> Self {
        self.request_expiry_supported = supported;
        self
    }

    pub fn build(self) -> DocumentService {
        info!(
            "document service ready (virus scan: {}, content validation: {}, request expiry: {})",
            self.virus_scanner.is_some(),
            self.validate_content_types,
            self.request_expiry_supported
        );
        DocumentService {
            key_ring: self.key_ring,
            storage: self.storage,
            virus_scanner: self.virus_scanner,
            validate_content_types: self.validate_content_types,
            request_expiry_supported: self.request_expiry_supported,
        }
    }
}

impl DocumentService {
    pub fn builder(key_ring: Arc<KeyRing>, storage: Arc<dyn Storage>) -> DocumentServiceBuilder {
        DocumentServiceBuilder {
            key_ring,
            storage,
            virus_scanner: None,
            validate_content_types: false,
            request_expiry_supported: true,
        }
    }

    /// Service without virus scanning or content validation.
    pub fn new(key_ring: Arc<KeyRing>, storage: Arc<dyn Storage>) -> Self {
        Self::builder(key_ring, storage).build()
    }

    /// Wires a service from configuration, creating a [`ClamAvScanner`] when
    /// scanning is enabled. Request expiry follows the storage config: it is
    /// only accepted when the bucket has no expiration rule.
    pub fn from_config(
        config: &ServiceConfig,
        storage_config: &StorageConfig,
        key_ring: Arc<KeyRing>,
        storage: Arc<dyn Storage>,
    ) -> DocumentResult<Self> {
        let mut builder = Self::builder(key_ring, storage)
            .validate_content_types(config.validate_content_types)
            .request_expiry_supported(storage_config.supports_request_expiry());

        if config.virus_scan_enabled {
            let url = config.virus_scan_url.as_deref().ok_or_else(|| {
                DocumentError::Config("virus scan enabled without a url".to_string())
            })?;
            let scanner = ClamAvScanner::new(url, config.virus_scan_timeout())?;
            builder = builder.virus_scanner(Arc::new(scanner));
        }
        Ok(builder.build())
    }

    pub fn key_ring(&self) -> &KeyRing {
        &self.key_ring
    }

    /// Scans, encrypts and stores `document` under a fresh id.
    pub async fn store(&self, document: &Document, owner: &Owner) -> DocumentResult<DocumentId> {
        self.store_expiring(document, owner, None).await
    }

    /// Like [`store`](Self::store), with an expiry hint for storage.
    pub async fn store_expiring(
        &self,
        document: &Document,
        owner: &Owner,
        expires_at: Option<DateTime<Utc>>,
    ) -> DocumentResult<DocumentId> {
        self.check_expiry(expires_at)?;
        self.admit(document).await?;
        let document_id = self.key_ring.new_document_id(None)?;
        self.persist(&document_id, self.key_ring.active_key_id(), document, owner, expires_at)
            .await?;
        Ok(document_id)
    }

    /// Returns the document, or `None` if nothing is stored for this
    /// (id, owner) pair.
    ///
    /// Fails with [`DocumentError::UnknownKey`] if the id's key has been
    /// retired from the ring.
    pub async fn fetch(
        &self,
        document_id: &DocumentId,
        owner: &Owner,
    ) -> DocumentResult<Option<Document>> {
        let key_id = self.key_ring.key_id_of(document_id)?;
        self.load(document_id, key_id, owner).await
    }

    /// Removes the document. Returns whether it existed.
    pub async fn delete(&self, document_id: &DocumentId, owner: &Owner) -> DocumentResult<bool> {
        let key_id = self.key_ring.key_id_of(document_id)?;
        let storage_key = self.storage_key(document_id, key_id, owner)?;
        let deleted = self.storage.delete(&storage_key).await?;
        debug!("delete {document_id}: existed = {deleted}");
        Ok(deleted)
    }

    /// Stores under a caller-chosen id, replacing any document previously
    /// stored under the same id and owner with the active key.
    ///
    /// With content validation on, only JSON documents are accepted.
    pub async fn store_with_custom_id(
        &self,
        custom_id: &CustomDocumentId,
        document: &Document,
        owner: &Owner,
        expires_at: Option<DateTime<Utc>>,
    ) -> DocumentResult<DocumentId> {
        self.check_expiry(expires_at)?;
        self.admit(document).await?;
        if self.validate_content_types
            && ContentType::from_mime(&document.content_type) != Some(ContentType::Json)
        {
            return Err(DocumentError::UnsupportedContentType(document.content_type.clone()));
        }
        let document_id = self.key_ring.new_document_id(Some(custom_id.as_str()))?;
        self.persist(&document_id, self.key_ring.active_key_id(), document, owner, expires_at)
            .await?;
        Ok(document_id)
    }

    /// Looks the custom id up under the active key first, then under every
    /// other decryption key, newest first.
    pub async fn fetch_by_custom_id(
        &self,
        custom_id: &CustomDocumentId,
        owner: &Owner,
    ) -> DocumentResult<Option<Document>> {
        for key_id in self.lookup_order() {
            let document_id = document_id::encode(key_id, custom_id.as_str())?;
            if let Some(document) = self.load(&document_id, key_id, owner).await? {
                return Ok(Some(document));
            }
        }
        debug!("no document for custom id {custom_id}");
        Ok(None)
    }

    /// Removes the custom-id document under every decryption key. Returns
    /// whether anything existed.
    pub async fn delete_by_custom_id(
        &self,
        custom_id: &CustomDocumentId,
        owner: &Owner,
    ) -> DocumentResult<bool> {
        let mut deleted = false;
        for key_id in self.lookup_order() {
            let document_id = document_id::encode(key_id, custom_id.as_str())?;
            let storage_key = self.storage_key(&document_id, key_id, owner)?;
            deleted |= self.storage.delete(&storage_key).await?;
        }
        Ok(deleted)
    }

    /// Fails if the storage backend is unreachable.
    pub async fn ready(&self) -> DocumentResult<()> {
        Ok(self.storage.ready().await?)
    }

    fn check_expiry(&self, expires_at: Option<DateTime<Utc>>) -> DocumentResult<()> {
        match expires_at {
            Some(at) if !self.request_expiry_supported => {
                debug!("rejecting requested expiry {at}: bucket expiration is configured");
                Err(DocumentError::ExpiryNotSupported)
            }
            _ => Ok(()),
        }
    }

    async fn admit(&self, document: &Document) -> DocumentResult<()> {
        if let Some(scanner) = &self.virus_scanner {
            virus_scan::ensure_clean(scanner.as_ref(), &document.content).await?;
        }
        if self.validate_content_types
            && !content_type::is_supported(&document.content_type, &document.content)
        {
            return Err(DocumentError::UnsupportedContentType(document.content_type.clone()));
        }
        Ok(())
    }

    async fn persist(
        &self,
        document_id: &DocumentId,
        key_id: KeyId,
        document: &Document,
        owner: &Owner,
        expires_at: Option<DateTime<Utc>>,
    ) -> DocumentResult<()> {
        let serialized = document::serialize(document)?;
        let encrypted = self.key_ring.encrypt_with(key_id, &serialized, owner)?;
        let storage_key = self.storage_key(document_id, key_id, owner)?;

        self.storage
            .put(&storage_key, &StorageValue::new(encrypted), expires_at)
            .await?;
        debug!("stored {document_id} with key id {key_id}");
        Ok(())
    }

    async fn load(
        &self,
        document_id: &DocumentId,
        key_id: KeyId,
        owner: &Owner,
    ) -> DocumentResult<Option<Document>> {
        let storage_key = self.storage_key(document_id, key_id, owner)?;
        let Some(value) = self.storage.get(&storage_key).await? else {
            debug!("no document stored for {document_id}");
            return Ok(None);
        };
        let serialized = self.key_ring.decrypt(value.as_str(), owner, key_id)?;
        Ok(Some(document::deserialize(&serialized)?))
    }

    fn storage_key(
        &self,
        document_id: &DocumentId,
        key_id: KeyId,
        owner: &Owner,
    ) -> DocumentResult<StorageKey> {
        let plain = format!("{owner}-{document_id}");
        let key = self.key_ring.encrypt_with(key_id, &plain, owner)?;
        trace!("storage key for {document_id}: {key}");
        Ok(StorageKey::new(key))
    }

    fn lookup_order(&self) -> Vec<KeyId> {
        let active = self.key_ring.active_key_id();
        std::iter::once(active)
            .chain(
                self.key_ring
                    .decryption_key_ids()
                    .into_iter()
                    .rev()
                    .filter(|id| *id != active),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_storage::InMemoryStorage;

    fn service(active: u32) -> (DocumentService, InMemoryStorage) {
        let ring = KeyRing::new(
            KeyId(active),
            [(KeyId(1), "pw1"), (KeyId(2), "pw2"), (KeyId(3), "pw3")],
        )
        .unwrap();
        let storage = InMemoryStorage::new();
        (DocumentService::new(Arc::new(ring), Arc::new(storage.clone())), storage)
    }

    #[test]
    fn lookup_order_starts_with_active_key() {
        let (service, _) = service(2);
        assert_eq!(service.lookup_order(), vec![KeyId(2), KeyId(3), KeyId(1)]);
    }

    #[test]
    fn storage_key_depends_on_owner() {
        let (service, _) = service(1);
        let id = service.key_ring().new_document_id(None).unwrap();
        let a = service.storage_key(&id, KeyId(1), &Owner::from("12345")).unwrap();
        let b = service.storage_key(&id, KeyId(1), &Owner::from("54321")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, service.storage_key(&id, KeyId(1), &Owner::from("12345")).unwrap());
    }

    #[tokio::test]
    async fn stored_value_is_not_plaintext() {
        let (service, storage) = service(1);
        let document = Document::new("secret title", b"secret body".to_vec(), "application/json");
        service.store(&document, &Owner::from("12345")).await.unwrap();

        let keys = storage.keys().await;
        assert_eq!(keys.len(), 1);
        let value = storage.get(&keys[0]).await.unwrap().unwrap();
        assert!(!value.as_str().contains("secret title"));
        assert!(!keys[0].as_str().contains("12345"));
    }
}
