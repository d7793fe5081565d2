//! Encryption and key management for docvault.
//!
//! Provides owner-scoped document encryption using:
//! - PBKDF2-HMAC-SHA256 for key derivation from operator passphrases
//! - AES-256-GCM for authenticated encryption
//! - A rotating key ring addressed by small integer key ids
//!
//! # Architecture
//!
//! Every encryption key is derived from two inputs:
//!
//! 1. **Passphrase**: A secret bound to a [`KeyId`], supplied by the operator
//!    through the environment. Exactly one key id is *active* for new
//!    encryption; older ids stay in the *decryption set* so existing
//!    documents remain readable.
//!
//! 2. **Owner**: The tenant identifier. It salts the key derivation and is
//!    used verbatim as the GCM nonce, so ciphertext is deterministic per
//!    (key id, owner, plaintext).
//!
//! Document ids are self-describing tokens that carry the key id they were
//! minted under, so decryption never needs a lookup table.

mod cipher;
pub mod config;
pub mod document_id;
mod error;
mod key_ring;
mod types;

pub use cipher::{Cipher, KEY_SIZE, MAX_IV_LEN, PBKDF2_ITERATIONS, TAG_SIZE};
pub use config::{parse_key_ids, KeyRingConfig, DEFAULT_PASSPHRASE_PREFIX};
pub use document_id::DocumentId;
pub use error::{CryptoError, CryptoResult};
pub use key_ring::KeyRing;
pub use types::{KeyId, Owner, Passphrase};
