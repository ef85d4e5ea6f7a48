//! Storage abstraction trait
//!
//! Objects live in named buckets. The local backend maps a bucket to a
//! directory; the S3 backend maps it to a key prefix inside one S3 bucket.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// handlers and the DSP pipeline never depend on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Make sure a bucket can receive objects. Idempotent.
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Store an object, failing with [`StorageError::AlreadyExists`] when the
    /// key is taken. Existing objects are never overwritten.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<()>;

    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Delete an object. Backends report [`StorageError::NotFound`] when they
    /// can tell the object was missing.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;

    /// Time-limited GET URL for the object
    async fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Cheap reachability probe used by `/health`
    async fn health_check(&self) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
