use super::{guess_content_type, BlobStore, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// Process-local store for development runs and tests.
///
/// Keys listed in `fail_puts_for` reject uploads, which lets callers exercise
/// the upload failure path without a real backend.
#[derive(Default)]
pub struct MemoryStore {
    bucket: String,
    bucket_created: RwLock<bool>,
    objects: RwLock<HashMap<String, StoredObject>>,
    fail_puts_for: RwLock<Vec<String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..Default::default()
        }
    }

    /// Seed an object without counting it as a write.
    pub fn insert(&self, key: &str, body: impl Into<Bytes>) {
        let object = StoredObject {
            body: body.into(),
            content_type: guess_content_type(key),
        };
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), object);
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Number of successful puts.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_puts_for(&self, key_suffix: &str) {
        self.fail_puts_for
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(key_suffix.to_string());
    }

    fn store(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<(), StoreError> {
        let rejected = self
            .fail_puts_for
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|suffix| key.ends_with(suffix.as_str()));
        if rejected {
            return Err(StoreError::Backend(format!("put {}: rejected by store", key)));
        }

        let object = StoredObject {
            body,
            content_type: content_type
                .map(str::to_string)
                .unwrap_or_else(|| guess_content_type(key)),
        };
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), object);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get(&self, key: &str, dest: &Path) -> Result<(), StoreError> {
        let object = self
            .object(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        tokio::fs::write(dest, &object.body).await?;
        Ok(())
    }

    async fn put(&self, key: &str, src: &Path, content_type: Option<&str>) -> Result<(), StoreError> {
        let body = tokio::fs::read(src).await?;
        self.store(key, Bytes::from(body), content_type)
    }

    async fn bucket_exists(&self) -> Result<bool, StoreError> {
        Ok(*self.bucket_created.read().unwrap_or_else(|e| e.into_inner()))
    }

    async fn create_bucket(&self) -> Result<(), StoreError> {
        *self.bucket_created.write().unwrap_or_else(|e| e.into_inner()) = true;
        Ok(())
    }
}
