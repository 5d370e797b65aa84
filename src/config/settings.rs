use crate::config::env::{self, EnvKey};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::PathBuf;
use std::thread;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub storage_backend: StorageBackend,
    pub minio_url: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub minio_region: String,
    pub transcode: TranscodeSettings,
}

/// Knobs shared by the orchestrator and its workers.
#[derive(Clone, Debug, Deserialize)]
pub struct TranscodeSettings {
    pub resolutions_folder: String,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub temp_dir: PathBuf,
    /// Upper bound on concurrent downloads, probes and transcodes across all jobs.
    pub pool_size: usize,
    /// Finished jobs kept for status queries before the oldest are evicted.
    pub job_retention: usize,
}

impl TranscodeSettings {
    pub fn default_pool_size() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            resolutions_folder: "resolutions".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            temp_dir: std::env::temp_dir(),
            pool_size: Self::default_pool_size(),
            job_retention: 1000,
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let storage_backend = match env::get_or(EnvKey::StorageBackend, "s3").to_lowercase().as_str() {
            "s3" | "minio" => StorageBackend::S3,
            "memory" => StorageBackend::Memory,
            other => bail!("Unsupported STORAGE_BACKEND: {}", other),
        };

        // Credentials are only mandatory when talking to a real bucket.
        let required = |key: EnvKey| -> Result<String> {
            let name = key.as_str();
            match storage_backend {
                StorageBackend::S3 => env::get(key).with_context(|| format!("{} must be set", name)),
                StorageBackend::Memory => Ok(env::get_or(key, "")),
            }
        };

        let defaults = TranscodeSettings::default();
        let pool_size = env::get_parsed(EnvKey::PoolSize, defaults.pool_size).max(1);
        let job_retention = env::get_parsed(EnvKey::JobRetention, defaults.job_retention).max(1);

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            storage_backend,
            minio_url: required(EnvKey::MinioUrl)?,
            minio_bucket: env::get(EnvKey::MinioBucket)
                .context("MINIO_BUCKET_NAME must be set")?,
            minio_access_key: required(EnvKey::MinioAccessKey)?,
            minio_secret_key: required(EnvKey::MinioSecretKey)?,
            minio_region: env::get_or(EnvKey::MinioRegion, "us-east-1"),
            transcode: TranscodeSettings {
                resolutions_folder: env::get_or(EnvKey::ResolutionsFolder, &defaults.resolutions_folder),
                ffmpeg_path: env::get_or(EnvKey::FfmpegPath, &defaults.ffmpeg_path),
                ffprobe_path: env::get_or(EnvKey::FfprobePath, &defaults.ffprobe_path),
                temp_dir: env::get(EnvKey::TempDir)
                    .map(PathBuf::from)
                    .unwrap_or(defaults.temp_dir),
                pool_size,
                job_retention,
            },
        })
    }
}
