//! MinIO/S3-compatible storage client
//!
//! Production [`ObjectStore`] implementation backed by MinIO or any
//! S3-compatible service, holding one bucket handle per configured bucket.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStore;

pub struct MinioStore {
    buckets: Vec<Box<Bucket>>,
    region: Region,
    credentials: Credentials,
}

impl MinioStore {
    /// Create a new MinIO-backed store from configuration
    ///
    /// Opens a handle per configured bucket (report photos and profile
    /// photos) and creates any bucket that does not exist yet.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
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

        let mut buckets = Vec::new();
        for name in [&config.report_bucket, &config.profile_bucket] {
            let mut bucket = Bucket::new(name, region.clone(), credentials.clone())
                .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

            // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
            bucket.set_path_style();
            buckets.push(bucket);
        }

        let store = Self {
            buckets,
            region,
            credentials,
        };

        for bucket in &store.buckets {
            store.ensure_bucket_exists(bucket).await?;
        }

        info!(
            "MinIO store initialized for endpoint: {}, buckets: {:?}",
            config.endpoint,
            store.buckets.iter().map(|b| b.name()).collect::<Vec<_>>()
        );

        Ok(store)
    }

    fn bucket(&self, name: &str) -> Result<&Bucket> {
        self.buckets
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
            .ok_or_else(|| AppError::Storage(format!("Unknown storage bucket '{}'", name)))
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self, bucket: &Bucket) -> Result<()> {
        // Try to create bucket - if it already exists, MinIO will return an
        // error which we can safely ignore
        let created = Bucket::create_with_path_style(
            &bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(_) => {
                info!("Bucket '{}' created successfully", bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                // Bucket already exists - this is fine
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", bucket.name());
                    Ok(())
                } else {
                    // Log warning but don't fail - bucket might exist with different error
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        bucket.name(),
                        e
                    );
                    Ok(())
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for MinioStore {
    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let bucket = self.bucket(bucket)?;
        bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload object '{}': {}", key, e)))?;

        debug!("Uploaded object '{}' to bucket '{}'", key, bucket.name());
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let bucket = self.bucket(bucket)?;
        let response = bucket
            .get_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to download object '{}': {}", key, e)))?;

        debug!(
            "Downloaded object '{}' from bucket '{}'",
            key,
            bucket.name()
        );
        Ok(response.to_vec())
    }

    async fn copy(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<()> {
        let bucket = self.bucket(bucket)?;
        bucket.copy_object_internal(src_key, dst_key).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to copy object '{}' to '{}': {}",
                src_key, dst_key, e
            ))
        })?;

        debug!(
            "Copied object '{}' to '{}' in bucket '{}'",
            src_key,
            dst_key,
            bucket.name()
        );
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let bucket = self.bucket(bucket)?;
        bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete object '{}': {}", key, e)))?;

        debug!("Deleted object '{}' from bucket '{}'", key, bucket.name());
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let bucket = self.bucket(bucket)?;
        match bucket.head_object(key).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to check if object '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }

    async fn presign_get(&self, bucket: &str, key: &str, expiry_secs: u32) -> Result<String> {
        let bucket = self.bucket(bucket)?;
        bucket.presign_get(key, expiry_secs, None).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to generate presigned URL for '{}': {}",
                key, e
            ))
        })
    }
}
