//! Documents addressed by caller-chosen ids.

mod support;

use docvault_crypto::{KeyId, Owner};
use docvault_service::{CustomDocumentId, Document, DocumentError, DocumentService};
use docvault_storage::InMemoryStorage;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{pdf, ring, service};

fn custom(id: &str) -> CustomDocumentId {
    CustomDocumentId::parse(id).unwrap()
}

#[tokio::test]
async fn store_and_fetch_by_custom_id() {
    let storage = InMemoryStorage::new();
    let service = service(ring(1, &[1]), &storage);
    let owner = Owner::from("12345");

    let id = service
        .store_with_custom_id(&custom("invoice42"), &pdf(), &owner, None)
        .await
        .unwrap();
    assert_eq!(id.seed().unwrap(), "invoice42");
    assert_eq!(
        service.fetch_by_custom_id(&custom("invoice42"), &owner).await.unwrap(),
        Some(pdf())
    );
    assert_eq!(service.fetch(&id, &owner).await.unwrap(), Some(pdf()));
}

#[tokio::test]
async fn same_custom_id_overwrites() {
    let storage = InMemoryStorage::new();
    let service = service(ring(1, &[1]), &storage);
    let owner = Owner::from("12345");
    let replacement = Document::new("B", vec![9], "application/json");

    service
        .store_with_custom_id(&custom("report"), &pdf(), &owner, None)
        .await
        .unwrap();
    service
        .store_with_custom_id(&custom("report"), &replacement, &owner, None)
        .await
        .unwrap();

    assert_eq!(storage.len().await, 1);
    assert_eq!(
        service.fetch_by_custom_id(&custom("report"), &owner).await.unwrap(),
        Some(replacement)
    );
}

#[tokio::test]
async fn custom_id_survives_rotation() {
    let storage = InMemoryStorage::new();
    let owner = Owner::from("12345");
    service(ring(1, &[1]), &storage)
        .store_with_custom_id(&custom("contract"), &pdf(), &owner, None)
        .await
        .unwrap();

    let rotated = service(ring(2, &[1, 2]), &storage);
    assert_eq!(rotated.key_ring().active_key_id(), KeyId(2));
    assert_eq!(
        rotated.fetch_by_custom_id(&custom("contract"), &owner).await.unwrap(),
        Some(pdf())
    );
}

#[tokio::test]
async fn newest_key_wins_after_restore() {
    let storage = InMemoryStorage::new();
    let owner = Owner::from("12345");
    service(ring(1, &[1]), &storage)
        .store_with_custom_id(&custom("contract"), &pdf(), &owner, None)
        .await
        .unwrap();

    let rotated = service(ring(2, &[1, 2]), &storage);
    let updated = Document::new("v2", vec![4, 5], "application/pdf");
    rotated
        .store_with_custom_id(&custom("contract"), &updated, &owner, None)
        .await
        .unwrap();

    assert_eq!(
        rotated.fetch_by_custom_id(&custom("contract"), &owner).await.unwrap(),
        Some(updated)
    );
    assert!(rotated.delete_by_custom_id(&custom("contract"), &owner).await.unwrap());
    assert!(storage.is_empty().await);
    assert!(!rotated.delete_by_custom_id(&custom("contract"), &owner).await.unwrap());
}

#[tokio::test]
async fn custom_id_is_owner_scoped() {
    let storage = InMemoryStorage::new();
    let service = service(ring(1, &[1]), &storage);

    service
        .store_with_custom_id(&custom("shared"), &pdf(), &Owner::from("12345"), None)
        .await
        .unwrap();
    let stranger = Owner::from("99999");
    assert_eq!(
        service.fetch_by_custom_id(&custom("shared"), &stranger).await.unwrap(),
        None
    );
    assert!(!service.delete_by_custom_id(&custom("shared"), &stranger).await.unwrap());
}

#[tokio::test]
async fn validated_custom_id_documents_must_be_json() {
    let storage = InMemoryStorage::new();
    let service = DocumentService::builder(ring(1, &[1]), Arc::new(storage.clone()))
        .validate_content_types(true)
        .build();
    let owner = Owner::from("12345");

    let real_pdf = Document::new("A", b"%PDF-1.7\n%...".to_vec(), "application/pdf");
    let result = service
        .store_with_custom_id(&custom("scan"), &real_pdf, &owner, None)
        .await;
    assert!(matches!(
        result,
        Err(DocumentError::UnsupportedContentType(t)) if t == "application/pdf"
    ));
    assert!(storage.is_empty().await);

    let json = Document::new("B", br#"{"step":3}"#.to_vec(), "application/json");
    service
        .store_with_custom_id(&custom("scan"), &json, &owner, None)
        .await
        .unwrap();
    assert_eq!(
        service.fetch_by_custom_id(&custom("scan"), &owner).await.unwrap(),
        Some(json)
    );
}
