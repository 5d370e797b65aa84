use super::dto::UploadResponse;
use crate::common::error::{AppError, AppResult};
use crate::common::upload::UploadedFile;
use crate::infrastructure::storage::BlobStore;
use tracing::info;

pub struct UploadService;

impl UploadService {
    /// Stores a spooled upload at `object_path`, or at its own file name when
    /// no path is given. The bucket is created on first use; the local copy is
    /// removed once the call returns.
    pub async fn store(
        storage: &dyn BlobStore,
        file: UploadedFile,
        object_path: Option<&str>,
    ) -> AppResult<UploadResponse> {
        let object_name = object_path
            .map(|p| p.trim().trim_matches('/'))
            .filter(|p| !p.is_empty())
            .unwrap_or(file.file_name.as_str())
            .to_string();

        if object_name.split('/').any(|segment| segment == "..") {
            return Err(AppError::Validation("object_path may not contain '..'".to_string()));
        }

        storage.ensure_bucket().await?;
        storage
            .put(&object_name, &file.path, file.content_type.as_deref())
            .await?;

        info!(
            kind = file.kind.as_str(),
            object_path = %object_name,
            bytes = file.size,
            "File uploaded"
        );

        Ok(UploadResponse {
            s3_path: storage.object_path(&object_name),
            uploaded_file_name: object_name,
        })
    }
}
