use super::resolution::ResolutionLabel;
use crate::infrastructure::media::Dimensions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RenditionStatus {
    Success,
    Failure,
}

/// Result of one (job, resolution) worker run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenditionOutcome {
    pub resolution: ResolutionLabel,
    pub status: RenditionStatus,
    pub storage_path: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl RenditionOutcome {
    pub fn success(resolution: ResolutionLabel, storage_path: String, duration: Duration) -> Self {
        Self {
            resolution,
            status: RenditionStatus::Success,
            storage_path: Some(storage_path),
            error: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn failure(resolution: ResolutionLabel, error: impl ToString, duration: Duration) -> Self {
        Self {
            resolution,
            status: RenditionStatus::Failure,
            storage_path: None,
            error: Some(error.to_string()),
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RenditionStatus::Success
    }
}

/// A downloaded and inspected source video.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SourceDescriptor {
    pub bucket_path: String,
    /// Server-side temp copy; never part of API responses.
    #[serde(skip)]
    #[schema(value_type = String)]
    pub local_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl SourceDescriptor {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Source file name without directory or extension.
    pub fn stem(&self) -> &str {
        let name = self.bucket_path.rsplit('/').next().unwrap_or(&self.bucket_path);
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranscodeJob {
    pub job_id: Uuid,
    pub folder: String,
    pub filename: String,
    pub requested_resolutions: BTreeSet<ResolutionLabel>,
    pub state: JobState,
    /// Completion order, not request order.
    pub results: Vec<RenditionOutcome>,
    pub failure_reason: Option<String>,
    pub source: Option<SourceDescriptor>,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String)]
    pub submitted_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601::option")]
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<OffsetDateTime>,
}

impl TranscodeJob {
    pub fn new(folder: &str, filename: &str, requested_resolutions: BTreeSet<ResolutionLabel>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            folder: folder.trim_matches('/').to_string(),
            filename: filename.trim_matches('/').to_string(),
            requested_resolutions,
            state: JobState::Pending,
            results: Vec::new(),
            failure_reason: None,
            source: None,
            submitted_at: OffsetDateTime::now_utc(),
            completed_at: None,
        }
    }

    /// Object key of the source video, `{folder}/{filename}`.
    pub fn source_key(&self) -> String {
        join_key(&[&self.folder, &self.filename])
    }

    pub fn outcome_for(&self, resolution: ResolutionLabel) -> Option<&RenditionOutcome> {
        self.results.iter().find(|o| o.resolution == resolution)
    }

    pub(crate) fn finish(&mut self, state: JobState, failure_reason: Option<String>) {
        self.state = state;
        self.failure_reason = failure_reason;
        self.completed_at = Some(OffsetDateTime::now_utc());
    }
}

/// Joins key segments with `/`, skipping empty ones.
pub fn join_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
