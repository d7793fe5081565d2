//! S3-backed storage.
//!
//! Each entry is one object in a single bucket; the object key is the
//! storage key and the body is the UTF-8 storage value. Per-document expiry
//! is attached as object metadata for the bucket's lifecycle tooling.

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::types::{StorageKey, StorageValue};
use crate::Storage;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, ExpirationStatus, LifecycleExpiration, LifecycleRule,
    LifecycleRuleFilter,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Metadata key carrying the advisory expiry timestamp (RFC 3339).
pub const EXPIRES_AT_METADATA: &str = "expires-at";

/// [`Storage`] over an S3-compatible bucket.
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    expiration_in_days: Option<u32>,
}

impl S3Storage {
    /// Builds a client from static credentials. Performs no I/O.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket must be set".to_string()));
        }
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(StorageError::Config(
                "access_key_id and secret_access_key must be set".to_string(),
            ));
        }

        let credentials = aws_credential_types::Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "docvault-static",
        );

        let mut config_builder = aws_sdk_s3::Config::builder()
            .region(aws_types::region::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .behavior_version_latest();

        if let Some(ref endpoint) = config.endpoint_override {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Ok(Self {
            client: S3Client::from_conf(config_builder.build()),
            bucket: config.bucket.clone(),
            expiration_in_days: config.expiration_in_days,
        })
    }

    /// Builds a client, creates the bucket if missing and applies the
    /// lifecycle configuration.
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        info!("initializing S3 storage");
        let storage = Self::new(config)?;
        storage.ensure_bucket().await?;
        storage.apply_lifecycle().await?;
        info!("S3 storage initialized");
        Ok(storage)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Creates the bucket unless it already exists.
    pub async fn ensure_bucket(&self) -> StorageResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("bucket {} already exists", self.bucket);
                Ok(())
            }
            Err(e) => {
                let service_err = e.into_service_error();
                if !service_err.is_not_found() {
                    return Err(StorageError::S3(format!(
                        "head bucket failed for {}: {service_err}",
                        self.bucket
                    )));
                }
                info!("bucket {} not found, creating", self.bucket);
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| {
                        StorageError::S3(format!("create bucket failed for {}: {e}", self.bucket))
                    })?;
                Ok(())
            }
        }
    }

    /// Installs a whole-bucket expiration rule when `expiration_in_days > 0`,
    /// otherwise removes any lifecycle configuration.
    pub async fn apply_lifecycle(&self) -> StorageResult<()> {
        match self.expiration_in_days.filter(|days| *days > 0) {
            Some(days) => {
                info!("bucket objects expire after {days} days");
                let rule = LifecycleRule::builder()
                    .id(format!("{}-{days}", self.bucket))
                    .filter(LifecycleRuleFilter::builder().prefix("").build())
                    .status(ExpirationStatus::Enabled)
                    .expiration(LifecycleExpiration::builder().days(days as i32).build())
                    .build()
                    .map_err(|e| StorageError::Config(format!("invalid lifecycle rule: {e}")))?;
                let lifecycle = BucketLifecycleConfiguration::builder()
                    .rules(rule)
                    .build()
                    .map_err(|e| {
                        StorageError::Config(format!("invalid lifecycle configuration: {e}"))
                    })?;

                self.client
                    .put_bucket_lifecycle_configuration()
                    .bucket(&self.bucket)
                    .lifecycle_configuration(lifecycle)
                    .send()
                    .await
                    .map_err(|e| StorageError::S3(format!("put lifecycle failed: {e}")))?;
            }
            None => {
                info!("removing any active lifecycle configuration");
                self.client
                    .delete_bucket_lifecycle()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| StorageError::S3(format!("delete lifecycle failed: {e}")))?;
            }
        }
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::S3(format!("head object failed: {service_err}")))
                }
            }
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn get(&self, key: &StorageKey) -> StorageResult<Option<StorageValue>> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    debug!("no object for storage key");
                    return Ok(None);
                }
                return Err(StorageError::S3(format!("get object failed: {service_err}")));
            }
        };

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("failed to read object body: {e}")))?;
        let value = String::from_utf8(body.into_bytes().to_vec())
            .map_err(|e| StorageError::S3(format!("object body is not UTF-8: {e}")))?;

        debug!("downloaded {} bytes from s3://{}", value.len(), self.bucket);
        Ok(Some(StorageValue::new(value)))
    }

    async fn put(
        &self,
        key: &StorageKey,
        value: &StorageValue,
        expires_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type("text/plain")
            .body(ByteStream::from(value.as_str().as_bytes().to_vec()));

        if let Some(expires_at) = expires_at {
            request = request.metadata(EXPIRES_AT_METADATA, expires_at.to_rfc3339());
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("put object failed: {e}")))?;

        debug!("uploaded {} bytes to s3://{}", value.len(), self.bucket);
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> StorageResult<bool> {
        if !self.exists(key).await? {
            return Ok(false);
        }

        if let Err(e) = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await
        {
            warn!("failed to delete object: {e}");
            return Err(StorageError::S3(format!("delete object failed: {e}")));
        }
        Ok(true)
    }

    async fn ready(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::NotReady(format!("bucket {} unreachable: {e}", self.bucket)))?;
        Ok(())
    }
}
