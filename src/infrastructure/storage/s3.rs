use super::{guess_content_type, BlobStore, StoreError};
use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::BehaviorVersion, config::Credentials, config::Region, Client};
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
}

fn backend_error<E: std::error::Error>(action: &str, key: &str, err: E) -> StoreError {
    StoreError::Backend(format!("{} {}: {}", action, key, DisplayErrorContext(err)))
}

impl StorageService {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        let client = Client::from_conf(config);

        info!(endpoint, bucket, "S3 storage client configured");

        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for StorageService {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get(&self, key: &str, dest: &Path) -> Result<(), StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_no_such_key()) {
                    StoreError::NotFound(key.to_string())
                } else {
                    backend_error("get", key, e)
                }
            })?;

        let mut reader = resp.body.into_async_read();
        let mut file = tokio::fs::File::create(dest).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;

        debug!(key, bytes = written, dest = %dest.display(), "Downloaded object");
        Ok(())
    }

    async fn put(&self, key: &str, src: &Path, content_type: Option<&str>) -> Result<(), StoreError> {
        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| backend_error("read", &src.display().to_string(), e))?;
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(key));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| backend_error("put", key, e))?;

        Ok(())
    }

    async fn bucket_exists(&self) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(false),
            Err(e) => Err(backend_error("head bucket", &self.bucket, e)),
        }
    }

    async fn create_bucket(&self) -> Result<(), StoreError> {
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| backend_error("create bucket", &self.bucket, e))?;

        info!(bucket = %self.bucket, "Created bucket");
        Ok(())
    }
}
