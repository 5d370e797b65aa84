use crate::common::error::{AppError, AppResult};
use axum::extract::multipart::Field;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Which allow-list an uploaded part is checked against, chosen by its form field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Banner,
}

impl UploadKind {
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "video" => Some(UploadKind::Video),
            "banner" => Some(UploadKind::Banner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Banner => "banner",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Video => VIDEO_EXTENSIONS,
            UploadKind::Banner => IMAGE_EXTENSIONS,
        }
    }
}

/// Checks the file extension (case-insensitive) against the kind's allow-list.
pub fn validate_extension(kind: UploadKind, file_name: &str) -> AppResult<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let allowed = kind.allowed_extensions();
    match extension {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => {
            let listed: Vec<String> = allowed.iter().map(|e| format!(".{}", e)).collect();
            Err(AppError::Validation(format!(
                "Invalid {} file type. Allowed types: {}",
                kind.as_str(),
                listed.join(", ")
            )))
        }
    }
}

/// A validated file part, spooled to a temp file that is removed on drop.
#[derive(Debug)]
pub struct UploadedFile {
    pub kind: UploadKind,
    pub file_name: String,
    pub content_type: Option<String>,
    pub path: TempPath,
    pub size: u64,
}

impl UploadedFile {
    /// Writes `chunks` to a file under `temp_dir` as they arrive. The extension
    /// is checked before the first chunk is read.
    pub async fn spool<S, E>(
        kind: UploadKind,
        file_name: &str,
        content_type: Option<String>,
        mut chunks: S,
        temp_dir: &Path,
    ) -> AppResult<Self>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        validate_extension(kind, file_name)?;

        tokio::fs::create_dir_all(temp_dir).await.map_err(AppError::Spool)?;
        let (file, path) = tempfile::Builder::new()
            .prefix("upload_")
            .tempfile_in(temp_dir)
            .map_err(AppError::Spool)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size = 0u64;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
            file.write_all(&chunk).await.map_err(AppError::Spool)?;
            size += chunk.len() as u64;
        }
        file.flush().await.map_err(AppError::Spool)?;

        if size == 0 {
            return Err(AppError::Validation("Empty file data".to_string()));
        }

        Ok(Self {
            kind,
            file_name: file_name.to_string(),
            content_type,
            path,
            size,
        })
    }

    pub async fn from_field(kind: UploadKind, field: Field<'_>, temp_dir: &Path) -> AppResult<Self> {
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation(format!("The {} part has no file name", kind.as_str())))?;
        let content_type = field.content_type().map(str::to_string);

        Self::spool(kind, &file_name, content_type, field, temp_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_allow_list() {
        assert!(validate_extension(UploadKind::Video, "clip.mp4").is_ok());
        assert!(validate_extension(UploadKind::Video, "CLIP.MOV").is_ok());
        assert!(validate_extension(UploadKind::Video, "clip.mkv").is_err());
        assert!(validate_extension(UploadKind::Video, "clip").is_err());
    }

    #[test]
    fn banner_gif_is_rejected_with_message() {
        let err = validate_extension(UploadKind::Banner, "banner.gif").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid banner file type. Allowed types: .jpg, .jpeg, .png"
        );
        assert!(validate_extension(UploadKind::Banner, "banner.jpeg").is_ok());
    }

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Unpin {
        futures_util::stream::iter(parts.iter().map(|p| Ok(Bytes::from_static(*p))).collect::<Vec<_>>())
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn chunks_are_spooled_to_a_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadedFile::spool(
            UploadKind::Video,
            "clip.mp4",
            Some("video/mp4".into()),
            chunks(&[&b"fra"[..], &b"mes"[..]]),
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(file.size, 6);
        assert!(file.path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&file.path).unwrap(), b"frames");

        drop(file);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadedFile::spool(UploadKind::Video, "a.mp4", None, chunks(&[&b""[..]]), dir.path())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Empty file data");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn extension_is_checked_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let broken = futures_util::stream::iter(vec![Err::<Bytes, _>(std::io::Error::other("connection reset"))]);

        let err = UploadedFile::spool(UploadKind::Banner, "banner.gif", None, broken, dir.path())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Invalid banner file type"), "{err}");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn interrupted_stream_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"part")),
            Err(std::io::Error::other("connection reset")),
        ]);

        let err = UploadedFile::spool(UploadKind::Video, "clip.mov", None, broken, dir.path())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to read upload: connection reset");
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn field_names_map_to_kinds() {
        assert_eq!(UploadKind::from_field_name("video"), Some(UploadKind::Video));
        assert_eq!(UploadKind::from_field_name("banner"), Some(UploadKind::Banner));
        assert_eq!(UploadKind::from_field_name("object_path"), None);
    }
}
