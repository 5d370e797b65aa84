use super::{stderr_tail, Dimensions, ToolError, VideoScaler};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct FfmpegTool {
    program: String,
}

impl FfmpegTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl VideoScaler for FfmpegTool {
    async fn scale(&self, input: &Path, target: Dimensions, output: &Path) -> Result<(), ToolError> {
        let scale = format!("scale={}:{}", target.width, target.height);
        debug!(input = %input.display(), output = %output.display(), %scale, "Running ffmpeg");

        let result = Command::new(&self.program)
            .args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(input)
            .args(["-vf", &scale])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ToolError::Spawn)?;

        if !result.status.success() {
            return Err(ToolError::Failed {
                status: result.status.to_string(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_reported_as_tool_error() {
        let tool = FfmpegTool::new("/nonexistent/ffmpeg-binary");
        let err = tool
            .scale(Path::new("/tmp/in.mp4"), Dimensions::new(256, 144), Path::new("/tmp/out.mp4"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("transcode tool error"));
    }
}
