//! Blob store collaborators.
//!
//! Every store is bound to a single bucket at construction time; object keys are
//! `{folder}/{filename}` for sources and `{folder}/{resolutions_folder}/{name}` for renditions.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub mod memory;
pub mod s3;

pub use memory::MemoryStore;
pub use s3::StorageService;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Backend(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Download `key` into the local file `dest`, replacing it if present.
    async fn get(&self, key: &str, dest: &Path) -> Result<(), StoreError>;

    /// Upload the local file `src` as `key`.
    async fn put(&self, key: &str, src: &Path, content_type: Option<&str>) -> Result<(), StoreError>;

    async fn bucket_exists(&self) -> Result<bool, StoreError>;

    async fn create_bucket(&self) -> Result<(), StoreError>;

    /// Creates the bucket on first use.
    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        if !self.bucket_exists().await? {
            tracing::info!(bucket = self.bucket(), "Bucket missing, creating it");
            self.create_bucket().await?;
        }
        Ok(())
    }

    /// Display path of an object, `{bucket}/{key}`.
    fn object_path(&self, key: &str) -> String {
        format!("{}/{}", self.bucket(), key)
    }
}

pub fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
