//! Media tool configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Locations of the external media tools and their optional deadline.
#[derive(Debug, Clone)]
pub struct MediaToolsConfig {
    /// FFmpeg binary (name resolved through PATH, or absolute path)
    pub ffmpeg_path: PathBuf,
    /// FFprobe binary
    pub ffprobe_path: PathBuf,
    /// Kill a tool that runs longer than this. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for MediaToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout: None,
        }
    }
}

impl MediaToolsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
            ffprobe_path: std::env::var("FFPROBE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffprobe")),
            timeout: std::env::var("MEDIA_TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}
