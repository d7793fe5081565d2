//! Document service configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time budget for one virus scan, in milliseconds.
pub const DEFAULT_VIRUS_SCAN_TIMEOUT_MS: u64 = 2000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Scan every document before it is stored.
    pub virus_scan_enabled: bool,

    /// ClamAV REST endpoint receiving the raw bytes.
    pub virus_scan_url: Option<String>,

    pub virus_scan_timeout_ms: u64,

    /// Reject documents whose declared content type is unsupported or does
    /// not match the content.
    pub validate_content_types: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            virus_scan_enabled: false,
            virus_scan_url: None,
            virus_scan_timeout_ms: DEFAULT_VIRUS_SCAN_TIMEOUT_MS,
            validate_content_types: false,
        }
    }
}

impl ServiceConfig {
    pub fn virus_scan_timeout(&self) -> Duration {
        Duration::from_millis(self.virus_scan_timeout_ms)
    }
}
