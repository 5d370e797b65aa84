//! External media tools: a prober that reports source dimensions and a scaler
//! that writes a resized copy of a video. Both are black boxes reached through
//! child processes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use utoipa::ToSchema;

pub mod ffmpeg;
pub mod probe;

pub use ffmpeg::FfmpegTool;
pub use probe::{parse_dimensions, FfprobeTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when `self` is smaller than `other` on both axes.
    pub fn strictly_within(&self, other: &Dimensions) -> bool {
        self.width < other.width && self.height < other.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run probe tool: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("probe tool exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("file has no video stream")]
    NoVideoStream,

    #[error("unparsable probe output: {0:?}")]
    Unparsable(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("transcode tool error: failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("transcode tool error: exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Width and height of the first video stream in `path`.
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError>;
}

#[async_trait]
pub trait VideoScaler: Send + Sync {
    async fn scale(&self, input: &Path, target: Dimensions, output: &Path) -> Result<(), ToolError>;
}

/// Last few lines of a tool's stderr, enough to explain a failure without
/// dumping the whole encoder log into job state.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    const MAX_LINES: usize = 5;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join("\n")
}
