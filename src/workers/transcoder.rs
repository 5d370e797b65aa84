use crate::common::error::AppResult;
use crate::infrastructure::media::VideoScaler;
use crate::infrastructure::storage::BlobStore;
use crate::modules::transcode::model::{join_key, RenditionOutcome, SourceDescriptor};
use crate::modules::transcode::resolution::ResolutionLabel;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempPath;
use tracing::{info, warn};
use uuid::Uuid;

/// Produces a single rendition: scale, upload, clean up.
///
/// Holds only shared read-only collaborators, so one instance can serve any
/// number of concurrent (job, resolution) runs.
#[derive(Clone)]
pub struct TranscodeWorker {
    store: Arc<dyn BlobStore>,
    scaler: Arc<dyn VideoScaler>,
    temp_dir: PathBuf,
}

/// `{stem}_{resolution}.mp4`
pub fn rendition_file_name(stem: &str, resolution: ResolutionLabel) -> String {
    format!("{}_{}.mp4", stem, resolution)
}

impl TranscodeWorker {
    pub fn new(store: Arc<dyn BlobStore>, scaler: Arc<dyn VideoScaler>, temp_dir: PathBuf) -> Self {
        Self { store, scaler, temp_dir }
    }

    /// Never fails: every error is folded into a `Failure` outcome.
    pub async fn run(
        &self,
        job_id: Uuid,
        source: &SourceDescriptor,
        resolution: ResolutionLabel,
        dest_prefix: &str,
    ) -> RenditionOutcome {
        let started = Instant::now();

        match self.produce(job_id, source, resolution, dest_prefix).await {
            Ok(storage_path) => {
                let elapsed = started.elapsed();
                info!(
                    job_id = %job_id,
                    resolution = %resolution,
                    storage_path = %storage_path,
                    duration_ms = elapsed.as_millis() as u64,
                    "Rendition uploaded"
                );
                RenditionOutcome::success(resolution, storage_path, elapsed)
            }
            Err(e) => {
                warn!(job_id = %job_id, resolution = %resolution, error = %e, "Rendition failed");
                RenditionOutcome::failure(resolution, e, started.elapsed())
            }
        }
    }

    async fn produce(
        &self,
        job_id: Uuid,
        source: &SourceDescriptor,
        resolution: ResolutionLabel,
        dest_prefix: &str,
    ) -> AppResult<String> {
        let output_name = rendition_file_name(source.stem(), resolution);
        // Namespaced per job so concurrent jobs on the same file never collide.
        let local_output = TempPath::from_path(self.temp_dir.join(format!("{}_{}", job_id, output_name)));

        self.scaler
            .scale(&source.local_path, resolution.dimensions(), &local_output)
            .await?;

        let key = join_key(&[dest_prefix, &output_name]);
        self.store
            .put(&key, &local_output, Some("video/mp4"))
            .await?;

        Ok(self.store.object_path(&key))
    }
}
