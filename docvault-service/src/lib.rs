//! Owner-scoped encrypted document store.
//!
//! Ties the key ring, the storage port and the virus scan gate together:
//! - Documents are scanned, serialized and encrypted under the active key
//! - Storage keys are re-derived from (owner, document id) on every call,
//!   so no index maps documents to storage locations
//! - A wrong owner derives a different storage key and simply misses
//!
//! All collaborators are injected at construction; there is no global state.

pub mod config;
pub mod content_type;
pub mod custom_id;
pub mod document;
pub mod error;
pub mod service;
pub mod telemetry;
pub mod virus_scan;

pub use config::ServiceConfig;
pub use content_type::ContentType;
pub use custom_id::CustomDocumentId;
pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use service::{DocumentService, DocumentServiceBuilder};
pub use virus_scan::{ClamAvScanner, ScanResult, VirusScanner};

pub use docvault_crypto::{DocumentId, KeyId, KeyRing, Owner};
