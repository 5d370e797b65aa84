use crate::config::settings::{AppConfig, StorageBackend};
use crate::infrastructure::media::{FfmpegTool, FfprobeTool, MediaProbe, VideoScaler};
use crate::infrastructure::storage::{BlobStore, MemoryStore, StorageService};
use crate::workers::TranscodeOrchestrator;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn BlobStore>,
    pub orchestrator: TranscodeOrchestrator,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn BlobStore>,
        probe: Arc<dyn MediaProbe>,
        scaler: Arc<dyn VideoScaler>,
    ) -> Self {
        let orchestrator = TranscodeOrchestrator::new(
            storage.clone(),
            probe,
            scaler,
            config.transcode.clone(),
        );

        Self {
            config,
            storage,
            orchestrator,
        }
    }

    /// Wires the production collaborators described by `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let storage: Arc<dyn BlobStore> = match config.storage_backend {
            StorageBackend::S3 => Arc::new(StorageService::new(
                &config.minio_url,
                &config.minio_bucket,
                &config.minio_region,
                &config.minio_access_key,
                &config.minio_secret_key,
            )),
            StorageBackend::Memory => {
                warn!("Using in-memory storage; objects are lost on restart");
                Arc::new(MemoryStore::new(&config.minio_bucket))
            }
        };

        let probe = Arc::new(FfprobeTool::new(config.transcode.ffprobe_path.clone()));
        let scaler = Arc::new(FfmpegTool::new(config.transcode.ffmpeg_path.clone()));

        Self::new(config, storage, probe, scaler)
    }
}
