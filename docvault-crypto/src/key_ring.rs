//! Rotating key ring.
//!
//! Holds one active encryption key id and the set of key ids still valid
//! for decryption. Each operation derives a fresh [`Cipher`] from the
//! passphrase of the requested key id and the owner as IV; the ring keeps
//! no per-call state.
//!
//! Rotation is a configuration concern: introduce a new active id and keep
//! every previously active id in the decryption set for as long as
//! documents encrypted under it may be read.

use crate::cipher::Cipher;
use crate::document_id::{self, DocumentId};
use crate::error::{CryptoError, CryptoResult};
use crate::types::{KeyId, Owner, Passphrase};
use std::collections::BTreeMap;
use tracing::{info, trace};
use uuid::Uuid;

/// Active encryption key plus all configured decryption keys.
#[derive(Debug, Clone)]
pub struct KeyRing {
    encryption_key_id: KeyId,
    passphrases: BTreeMap<KeyId, Passphrase>,
}

impl KeyRing {
    /// Builds a key ring.
    ///
    /// Fails with [`CryptoError::Configuration`] if `encryption_key_id` has no
    /// entry in `decryption_keys`, if any passphrase is blank, or if a key id
    /// is 0. Refusing to
    /// start is preferable to writing documents that can never be read back.
    pub fn new<P>(
        encryption_key_id: KeyId,
        decryption_keys: impl IntoIterator<Item = (KeyId, P)>,
    ) -> CryptoResult<Self>
    where
        P: Into<Passphrase>,
    {
        let passphrases: BTreeMap<KeyId, Passphrase> = decryption_keys
            .into_iter()
            .map(|(id, passphrase)| (id, passphrase.into()))
            .collect();

        if passphrases.contains_key(&KeyId(0)) {
            return Err(CryptoError::Configuration(
                "key ids must be positive, found 0".to_string(),
            ));
        }
        if let Some((id, _)) = passphrases.iter().find(|(_, p)| p.is_blank()) {
            return Err(CryptoError::Configuration(format!(
                "passphrase for key id {id} is empty"
            )));
        }
        if !passphrases.contains_key(&encryption_key_id) {
            return Err(CryptoError::Configuration(format!(
                "active encryption key id {encryption_key_id} is not in the decryption set"
            )));
        }

        info!("generating document ids with key id {encryption_key_id}");
        info!(
            "decrypting with {} possible key ids: {:?}",
            passphrases.len(),
            passphrases.keys().map(|k| k.value()).collect::<Vec<_>>()
        );

        Ok(Self {
            encryption_key_id,
            passphrases,
        })
    }

    /// The key id used for all new encryption.
    pub fn active_key_id(&self) -> KeyId {
        self.encryption_key_id
    }

    /// All key ids with a configured passphrase, ascending.
    pub fn decryption_key_ids(&self) -> Vec<KeyId> {
        self.passphrases.keys().copied().collect()
    }

    pub fn can_decrypt(&self, key_id: KeyId) -> bool {
        self.passphrases.contains_key(&key_id)
    }

    /// Encrypts with the active key, IV = owner.
    pub fn encrypt(&self, plaintext: &str, owner: &Owner) -> CryptoResult<String> {
        self.encrypt_with(self.encryption_key_id, plaintext, owner)
    }

    /// Encrypts with a specific key id from the decryption set.
    ///
    /// Used to re-derive storage keys for documents minted under an older key.
    pub fn encrypt_with(&self, key_id: KeyId, plaintext: &str, owner: &Owner) -> CryptoResult<String> {
        trace!("encrypting with key id {key_id}");
        self.cipher(key_id, owner)?.encrypt(plaintext)
    }

    /// Decrypts with the passphrase for `key_id`, IV = owner.
    pub fn decrypt(&self, ciphertext: &str, owner: &Owner, key_id: KeyId) -> CryptoResult<String> {
        trace!("decrypting with key id {key_id}");
        self.cipher(key_id, owner)?.decrypt(ciphertext)
    }

    /// Mints a document id bound to the active key id.
    ///
    /// Without a seed a random UUID is used.
    pub fn new_document_id(&self, seed: Option<&str>) -> CryptoResult<DocumentId> {
        let seed = match seed {
            Some(seed) => seed.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let id = document_id::encode(self.encryption_key_id, &seed)?;
        trace!("generated document id {id}");
        Ok(id)
    }

    /// Extracts the key id from a document id. Involves no secret material.
    pub fn key_id_of(&self, id: &DocumentId) -> CryptoResult<KeyId> {
        id.key_id()
    }

    fn cipher(&self, key_id: KeyId, owner: &Owner) -> CryptoResult<Cipher> {
        let passphrase = self
            .passphrases
            .get(&key_id)
            .ok_or(CryptoError::UnknownKey(key_id))?;
        Cipher::new(passphrase.expose(), owner.as_str())
    }
}
