use super::{stderr_tail, Dimensions, MediaProbe, ProbeError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// `ffprobe` configured to print `width,height` of the first video stream.
#[derive(Clone, Debug)]
pub struct FfprobeTool {
    program: String,
}

impl FfprobeTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl MediaProbe for FfprobeTool {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        let output = Command::new(&self.program)
            .args([
                "-v", "error",
                "-select_streams", "v:0",
                "-show_entries", "stream=width,height",
                "-of", "csv=s=,:p=0",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let dims = parse_dimensions(&stdout)?;
        debug!(path = %path.display(), %dims, "Probed source");
        Ok(dims)
    }
}

/// Parses the first line of probe output as `width,height`.
pub fn parse_dimensions(output: &str) -> Result<Dimensions, ProbeError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or(ProbeError::NoVideoStream)?;

    let mut parts = line.split(',').map(str::trim);
    let parsed = match (parts.next(), parts.next()) {
        (Some(w), Some(h)) => w.parse::<u32>().ok().zip(h.parse::<u32>().ok()),
        _ => None,
    };

    match parsed {
        Some((width, height)) if width > 0 && height > 0 => Ok(Dimensions::new(width, height)),
        _ => Err(ProbeError::Unparsable(line.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_line() {
        assert_eq!(parse_dimensions("1920,1080\n").unwrap(), Dimensions::new(1920, 1080));
        assert_eq!(parse_dimensions("\n640,480\n1280,720\n").unwrap(), Dimensions::new(640, 480));
    }

    #[test]
    fn tolerates_trailing_separator() {
        // Some ffprobe builds emit a trailing comma with csv output.
        assert_eq!(parse_dimensions("854,480,\n").unwrap(), Dimensions::new(854, 480));
    }

    #[test]
    fn empty_output_means_no_video_stream() {
        assert!(matches!(parse_dimensions(""), Err(ProbeError::NoVideoStream)));
        assert!(matches!(parse_dimensions("  \n"), Err(ProbeError::NoVideoStream)));
    }

    #[test]
    fn garbage_is_unparsable() {
        assert!(matches!(parse_dimensions("N/A,N/A"), Err(ProbeError::Unparsable(_))));
        assert!(matches!(parse_dimensions("1920"), Err(ProbeError::Unparsable(_))));
        assert!(matches!(parse_dimensions("0,0"), Err(ProbeError::Unparsable(_))));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let probe = FfprobeTool::new("/nonexistent/ffprobe-binary");
        let err = probe.dimensions(Path::new("/tmp/none.mp4")).await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn(_)));
    }
}
