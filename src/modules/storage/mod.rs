//! Storage module for photo objects
//!
//! Exposes the [`ObjectStore`] contract the staging and report services
//! depend on, plus the MinIO/S3-compatible production implementation.

mod minio_store;
mod object_store;

pub use minio_store::MinioStore;
pub use object_store::ObjectStore;
