//! FFprobe geometry probing.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use tubely_models::{Dimensions, OrientationCategory};

use crate::command::{run_tool, stderr_text};
use crate::config::MediaToolsConfig;
use crate::error::{MediaError, MediaResult};

/// Reads the geometry of a media file's primary video stream.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe_dimensions(&self, path: &Path) -> MediaResult<Dimensions>;
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `-show_entries stream=width,height -of json` output.
///
/// Only the first stream is read; ffprobe was asked for `v:0` alone.
pub fn parse_dimensions(stdout: &[u8]) -> MediaResult<Dimensions> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| MediaError::invalid_video("No video stream found"))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok(Dimensions::new(width, height)),
        (Some(width), Some(height)) => Err(MediaError::invalid_video(format!(
            "Invalid stream dimensions {}x{}",
            width, height
        ))),
        _ => Err(MediaError::invalid_video("Video stream has no width/height")),
    }
}

/// `MediaProbe` backed by the ffprobe CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new(&MediaToolsConfig::default())
    }
}

impl FfprobeProbe {
    pub fn new(config: &MediaToolsConfig) -> Self {
        Self {
            binary: config.ffprobe_path.clone(),
            timeout: config.timeout,
        }
    }

    fn build_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=width,height".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe_dimensions(&self, path: &Path) -> MediaResult<Dimensions> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let mut command = Command::new(&self.binary);
        command.args(Self::build_args(path));

        let output = run_tool(command, "ffprobe", self.timeout)
            .await
            .map_err(|e| match e {
                MediaError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    MediaError::FfprobeNotFound(self.binary.display().to_string())
                }
                other => other,
            })?;

        if !output.status.success() {
            return Err(MediaError::ffprobe_failed(
                format!("FFprobe exited with status {:?}", output.status.code()),
                stderr_text(&output),
                output.status.code(),
            ));
        }

        let dims = parse_dimensions(&output.stdout)?;
        debug!(path = %path.display(), dimensions = %dims, "Probed video geometry");
        Ok(dims)
    }
}

/// Probe a file and classify its orientation.
pub async fn probe_orientation(
    probe: &dyn MediaProbe,
    path: &Path,
) -> MediaResult<(Dimensions, OrientationCategory)> {
    let dims = probe.probe_dimensions(path).await?;
    Ok((dims, dims.orientation()))
}
