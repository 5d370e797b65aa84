use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// `{bucket}/{object_path}`
    pub s3_path: String,
    pub uploaded_file_name: String,
}

/// Shape of the multipart form, for documentation only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Video file (.mp4, .mov). Send either `video` or `banner`.
    #[schema(value_type = String, format = Binary)]
    pub video: Option<Vec<u8>>,
    /// Banner image (.jpg, .jpeg, .png).
    #[schema(value_type = String, format = Binary)]
    pub banner: Option<Vec<u8>>,
    /// Target object key; defaults to the uploaded file name.
    pub object_path: Option<String>,
}
