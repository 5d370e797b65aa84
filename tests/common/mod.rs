#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use transcoder::config::settings::{AppConfig, StorageBackend, TranscodeSettings};
use transcoder::infrastructure::media::{Dimensions, MediaProbe, ProbeError, ToolError, VideoScaler};
use transcoder::infrastructure::storage::MemoryStore;
use transcoder::state::AppState;
use transcoder::workers::TranscodeOrchestrator;

pub const BUCKET: &str = "media";

/// Reports fixed dimensions, or fails like a file without a video stream.
pub struct FixedProbe(pub Option<Dimensions>);

#[async_trait]
impl MediaProbe for FixedProbe {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        assert!(path.exists(), "probe called before download: {}", path.display());
        self.0.ok_or(ProbeError::NoVideoStream)
    }
}

/// Sleeps while "inspecting" and records how many inspections overlap.
pub struct SlowProbe {
    pub dims: Dimensions,
    pub delay: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl SlowProbe {
    pub fn new(dims: Dimensions, delay: Duration) -> Self {
        Self {
            dims,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProbe for SlowProbe {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        assert!(path.exists(), "probe called before download: {}", path.display());
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.dims)
    }
}

/// Writes the target size into the output file and tracks how many scale
/// calls are in flight at once.
#[derive(Default)]
pub struct CountingScaler {
    pub delay: Duration,
    pub fail_for: HashSet<Dimensions>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl CountingScaler {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, ..Default::default() }
    }

    pub fn failing_for(dims: Dimensions) -> Self {
        Self {
            fail_for: HashSet::from([dims]),
            ..Default::default()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoScaler for CountingScaler {
    async fn scale(&self, input: &Path, target: Dimensions, output: &Path) -> Result<(), ToolError> {
        assert!(input.exists(), "source missing while scaling: {}", input.display());
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let written = tokio::fs::write(output, target.to_string()).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        written.map_err(ToolError::Spawn)?;

        if self.fail_for.contains(&target) {
            return Err(ToolError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "Error while filtering".to_string(),
            });
        }
        Ok(())
    }
}

pub fn settings(temp_dir: &Path, pool_size: usize) -> TranscodeSettings {
    TranscodeSettings {
        resolutions_folder: "resolutions".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        temp_dir: PathBuf::from(temp_dir),
        pool_size,
        job_retention: 100,
    }
}

pub fn config(temp_dir: &Path, pool_size: usize) -> AppConfig {
    AppConfig {
        server_port: 0,
        storage_backend: StorageBackend::Memory,
        minio_url: String::new(),
        minio_bucket: BUCKET.to_string(),
        minio_access_key: String::new(),
        minio_secret_key: String::new(),
        minio_region: "us-east-1".to_string(),
        transcode: settings(temp_dir, pool_size),
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub scaler: Arc<CountingScaler>,
    pub orchestrator: TranscodeOrchestrator,
    pub temp: tempfile::TempDir,
}

pub fn harness(probe: Option<Dimensions>, scaler: CountingScaler, pool_size: usize) -> Harness {
    harness_with(Arc::new(FixedProbe(probe)), scaler, |s| s.pool_size = pool_size)
}

pub fn harness_with(
    probe: Arc<dyn MediaProbe>,
    scaler: CountingScaler,
    tune: impl FnOnce(&mut TranscodeSettings),
) -> Harness {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(MemoryStore::new(BUCKET));
    let scaler = Arc::new(scaler);
    let mut settings = settings(temp.path(), 1);
    tune(&mut settings);
    let orchestrator = TranscodeOrchestrator::new(store.clone(), probe, scaler.clone(), settings);
    Harness { store, scaler, orchestrator, temp }
}

pub fn app_state(probe: Option<Dimensions>) -> (AppState, Arc<MemoryStore>, tempfile::TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(MemoryStore::new(BUCKET));
    let state = AppState::new(
        config(temp.path(), 2),
        store.clone(),
        Arc::new(FixedProbe(probe)),
        Arc::new(CountingScaler::default()),
    );
    (state, store, temp)
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).expect("read temp dir").next().is_none()
}
