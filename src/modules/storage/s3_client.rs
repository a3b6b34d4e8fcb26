//! S3-compatible storage client
//!
//! Implements [`ObjectStore`] for MinIO or any S3-compatible service.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};
use url::Url;

use crate::core::config::ConnectionSettings;
use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStore;

const STATUS_NOT_FOUND: u16 = 404;

/// S3-compatible storage client bound to one bucket
pub struct S3Client {
    bucket: Box<Bucket>,
}

impl S3Client {
    /// Create a client for the configured endpoint and bucket
    ///
    /// No request is sent; bucket existence is checked separately.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.url).map_err(|e| {
            AppError::Connection(format!("Invalid endpoint URL '{}': {}", settings.url, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(AppError::Connection(format!(
                "Endpoint URL '{}' must be an http(s) URL with a host",
                settings.url
            )));
        }

        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Connection(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.url.trim_end_matches('/').to_string(),
        };

        let mut bucket = Bucket::new(&settings.bucket_name, region, credentials).map_err(|e| {
            AppError::Connection(format!("Failed to create S3 bucket handle: {}", e))
        })?;

        // Use path-style URLs (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        info!(
            "S3 client initialized for endpoint: {}, bucket: {}",
            settings.url,
            bucket.name()
        );

        Ok(Self { bucket })
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    async fn bucket_exists(&self) -> Result<bool> {
        self.bucket.exists().await.map_err(|e| {
            AppError::NotFound(format!(
                "Bucket '{}' does not exist or is not accessible: {}",
                self.bucket.name(),
                e
            ))
        })
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let results = self
            .bucket
            .list(prefix.to_string(), None)
            .await
            .map_err(|e| {
                AppError::Access(format!(
                    "Failed to list objects with prefix '{}': {}",
                    prefix, e
                ))
            })?;

        let keys: Vec<String> = results
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect();

        debug!(
            "Listed {} objects with prefix '{}' in bucket '{}'",
            keys.len(),
            prefix,
            self.bucket.name()
        );
        Ok(keys)
    }

    async fn put_stream(
        &self,
        key: &str,
        mut reader: &mut (dyn AsyncRead + Unpin + Send),
        content_type: &str,
    ) -> Result<u64> {
        // Large bodies go out as a multipart upload, one chunk in memory at a time
        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await
            .map_err(|e| AppError::Access(format!("Failed to upload '{}': {}", key, e)))?;

        if !is_success(response.status_code()) {
            return Err(AppError::Access(format!(
                "Failed to upload '{}': status {}",
                key,
                response.status_code()
            )));
        }

        let size = response.uploaded_bytes() as u64;
        debug!(
            "Uploaded '{}' ({} bytes, {}) to bucket '{}'",
            key,
            size,
            content_type,
            self.bucket.name()
        );
        Ok(size)
    }

    async fn get_to_writer(
        &self,
        key: &str,
        mut writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<bool> {
        let status = match self.bucket.get_object_to_writer(key, &mut writer).await {
            Ok(status) => status,
            Err(S3Error::HttpFailWithBody(status, _)) => status,
            Err(e) => {
                return Err(AppError::Access(format!(
                    "Failed to download '{}': {}",
                    key, e
                )))
            }
        };

        match status {
            STATUS_NOT_FOUND => Ok(false),
            status if is_success(status) => {
                debug!(
                    "Downloaded '{}' from bucket '{}'",
                    key,
                    self.bucket.name()
                );
                Ok(true)
            }
            status => Err(AppError::Access(format!(
                "Failed to download '{}': status {}",
                key, status
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let status = match self.bucket.delete_object(key).await {
            Ok(response) => response.status_code(),
            Err(S3Error::HttpFailWithBody(status, _)) => status,
            Err(e) => {
                return Err(AppError::Access(format!(
                    "Failed to delete '{}': {}",
                    key, e
                )))
            }
        };

        if !is_success(status) && status != STATUS_NOT_FOUND {
            return Err(AppError::Access(format!(
                "Failed to delete '{}': status {}",
                key, status
            )));
        }

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}
