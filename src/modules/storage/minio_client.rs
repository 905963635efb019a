//! MinIO/S3-compatible blob store
//!
//! Attachment bytes are private objects served back through the API, so the bucket needs no
//! public policy. Uses the rust-s3 crate with path-style URLs.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::blob_store::BlobStore;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    key_prefix: String,
}

fn unavailable(action: &str, key: &str, err: impl std::fmt::Display) -> AppError {
    AppError::StoreUnavailable(format!("Failed to {} blob '{}': {}", action, key, err))
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // http://endpoint/bucket instead of http://bucket.endpoint
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            key_prefix: config.key_prefix,
        };

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, key_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.key_prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let created = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    /// Prefix every attachment key is written under
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| unavailable("upload", key, e))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(unavailable("upload", key, format!("HTTP {}", status)));
        }

        debug!("Uploaded blob '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let response = match self.bucket.get_object(key).await {
            Ok(response) => response,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    return Ok(None);
                }
                return Err(unavailable("download", key, e));
            }
        };

        match response.status_code() {
            200..=299 => {
                debug!("Downloaded blob '{}'", key);
                Ok(Some(response.to_vec()))
            }
            404 => Ok(None),
            status => Err(unavailable("download", key, format!("HTTP {}", status))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| unavailable("delete", key, e))?;

        let status = response.status_code();
        if !(200..300).contains(&status) && status != 404 {
            return Err(unavailable("delete", key, format!("HTTP {}", status)));
        }

        debug!("Deleted blob '{}'", key);
        Ok(())
    }
}
