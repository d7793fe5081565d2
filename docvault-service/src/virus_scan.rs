//! Virus scan gate.
//!
//! Scanners report one of three outcomes. The service refuses infected
//! documents and stores anyway when the scan itself fails, so a scanner
//! outage never blocks uploads.

use crate::error::{DocumentError, DocumentResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Outcome of scanning one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanResult {
    Clean,
    Infected,
    /// The scanner could not produce a verdict.
    ScanError,
}

/// Inspects raw document bytes before they are stored.
#[async_trait]
pub trait VirusScanner: Send + Sync {
    async fn scan(&self, content: &[u8]) -> ScanResult;
}

/// Fail-open gate: only a positive result stops the upload.
pub(crate) async fn ensure_clean(scanner: &dyn VirusScanner, content: &[u8]) -> DocumentResult<()> {
    match scanner.scan(content).await {
        ScanResult::Clean => {
            debug!("virus scan clean ({} bytes)", content.len());
            Ok(())
        }
        ScanResult::Infected => {
            warn!("virus scan rejected document ({} bytes)", content.len());
            Err(DocumentError::Infected)
        }
        ScanResult::ScanError => {
            warn!("virus scan failed, storing document without a verdict");
            Ok(())
        }
    }
}

#[derive(Deserialize)]
struct ClamAvVerdict {
    #[serde(rename = "Result")]
    result: String,
}

/// Client for a ClamAV REST endpoint.
///
/// The raw bytes are PUT to the endpoint, which answers with
/// `[{"Filename": ..., "Result": "OK" | "FOUND"}]`.
pub struct ClamAvScanner {
    client: Client,
    url: String,
}

impl ClamAvScanner {
    pub fn new(url: impl Into<String>, timeout: Duration) -> DocumentResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(DocumentError::Config("virus scan url must be set".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocumentError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request_verdict(&self, content: &[u8]) -> Result<Vec<ClamAvVerdict>, String> {
        let resp = self
            .client
            .put(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("scanner returned {status}"));
        }
        resp.json::<Vec<ClamAvVerdict>>()
            .await
            .map_err(|e| format!("unexpected response: {e}"))
    }
}

#[async_trait]
impl VirusScanner for ClamAvScanner {
    async fn scan(&self, content: &[u8]) -> ScanResult {
        let verdicts = match self.request_verdict(content).await {
            Ok(verdicts) => verdicts,
            Err(e) => {
                error!("virus scan error: {e}");
                return ScanResult::ScanError;
            }
        };

        match verdicts.as_slice() {
            [verdict] if verdict.result.eq_ignore_ascii_case("OK") => ScanResult::Clean,
            [verdict] => {
                warn!("scanner reported {}", verdict.result);
                ScanResult::Infected
            }
            other => {
                error!("expected exactly one scan result, got {}", other.len());
                ScanResult::ScanError
            }
        }
    }
}
