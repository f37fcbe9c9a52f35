use async_trait::async_trait;

use crate::core::error::Result;

/// Narrow contract over the blob store.
///
/// The platform uses two buckets (report photos, profile photos); every
/// operation names its bucket explicitly so the staging service can keep
/// working against whichever bucket an upload was staged into.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object, overwriting any existing object at the key
    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Fetch an object's bytes
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Server-side copy within a bucket, preserving content type
    async fn copy(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<()>;

    /// Delete an object (idempotent on the store side)
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Check whether an object exists
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Generate a presigned download URL valid for `expiry_secs`
    async fn presign_get(&self, bucket: &str, key: &str, expiry_secs: u32) -> Result<String>;
}
