//! Key ring configuration.
//!
//! Key ids come from configuration; passphrases are resolved from
//! environment variables named `<PREFIX>_<KeyId>`.

use crate::error::{CryptoError, CryptoResult};
use crate::key_ring::KeyRing;
use crate::types::{KeyId, Passphrase};
use serde::{Deserialize, Serialize};

/// Default environment variable prefix for passphrases.
pub const DEFAULT_PASSPHRASE_PREFIX: &str = "CRYPTO_PASSPHRASE";

/// Which key ids to load and where their passphrases live.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyRingConfig {
    /// Prefix of the passphrase environment variables.
    pub passphrase_prefix: String,

    /// Key id used for all new encryption.
    pub encryption_key_id: KeyId,

    /// Additional key ids that must stay decryptable. The active id is
    /// always included, whether or not it is listed here.
    pub decryption_key_ids: Vec<KeyId>,
}

impl Default for KeyRingConfig {
    fn default() -> Self {
        Self {
            passphrase_prefix: DEFAULT_PASSPHRASE_PREFIX.to_string(),
            encryption_key_id: KeyId(1),
            decryption_key_ids: Vec::new(),
        }
    }
}

impl KeyRingConfig {
    /// Name of the variable holding the passphrase for `key_id`.
    pub fn variable_name(&self, key_id: KeyId) -> String {
        format!("{}_{}", self.passphrase_prefix, key_id)
    }

    /// Builds a key ring, reading passphrases from the process environment.
    pub fn build_key_ring(&self) -> CryptoResult<KeyRing> {
        self.build_key_ring_with(|name| std::env::var(name).ok())
    }

    /// Builds a key ring, resolving each passphrase through `lookup`.
    pub fn build_key_ring_with<F>(&self, lookup: F) -> CryptoResult<KeyRing>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ids = self.decryption_key_ids.clone();
        if !ids.contains(&self.encryption_key_id) {
            ids.push(self.encryption_key_id);
        }

        let mut keys = Vec::with_capacity(ids.len());
        for id in ids {
            let name = self.variable_name(id);
            let value = lookup(&name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    CryptoError::Configuration(format!("environment variable {name} must be set"))
                })?;
            keys.push((id, Passphrase::new(value)));
        }

        KeyRing::new(self.encryption_key_id, keys)
    }
}

/// Parses a comma-separated list of key ids, e.g. `"1, 2,3"`.
///
/// Empty entries are skipped so an empty string yields an empty list.
/// Key ids are positive; `0` is a configuration error.
pub fn parse_key_ids(list: &str) -> CryptoResult<Vec<KeyId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<KeyId>() {
            Ok(KeyId(0)) => Err(CryptoError::Configuration(
                "key id 0 is not allowed, key ids start at 1".to_string(),
            )),
            Ok(id) => Ok(id),
            Err(e) => Err(CryptoError::Configuration(format!("invalid key id '{s}': {e}"))),
        })
        .collect()
}
