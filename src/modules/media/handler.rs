use super::dto::{UploadForm, UploadResponse};
use super::service::UploadService;
use crate::common::error::AppError;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::common::upload::{UploadKind, UploadedFile};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use std::path::Path;
use tracing::info;

/// Upload a video or banner image
///
/// Multipart form with a `video` or `banner` file part and an optional
/// `object_path` text part.
#[utoipa::path(
    post,
    path = "/api/v1/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload successful", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Invalid file type, empty file or missing file part"),
        (status = 500, description = "Storage error")
    ),
    tag = "Upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let (file, object_path) = match read_form(multipart, &state.config.transcode.temp_dir).await {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    info!(kind = file.kind.as_str(), file_name = %file.file_name, bytes = file.size, "Received upload");

    match UploadService::store(state.storage.as_ref(), file, object_path.as_deref()).await {
        Ok(res) => ApiSuccess::ok(res, "File uploaded successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Collects the form. File parts are streamed to `temp_dir` as they arrive.
async fn read_form(
    mut multipart: Multipart,
    temp_dir: &Path,
) -> Result<(UploadedFile, Option<String>), AppError> {
    let mut file = None;
    let mut object_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "object_path" {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid object_path: {}", e)))?;
            object_path = Some(value);
        } else if let Some(kind) = UploadKind::from_field_name(&name) {
            file = Some(UploadedFile::from_field(kind, field, temp_dir).await?);
        }
    }

    let file = file.ok_or_else(|| {
        AppError::Validation("No video or banner field found in multipart request".to_string())
    })?;
    Ok((file, object_path))
}
