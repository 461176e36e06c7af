//! Upload pipeline configuration.

use std::path::PathBuf;

use tubely_models::MAX_VIDEO_UPLOAD_BYTES;

/// Configuration for the upload pipeline.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Scratch directory for staged and remuxed files
    pub assets_root: PathBuf,
    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("./assets"),
            max_upload_bytes: MAX_VIDEO_UPLOAD_BYTES,
        }
    }
}

impl IngestConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            assets_root: std::env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./assets")),
            max_upload_bytes: MAX_VIDEO_UPLOAD_BYTES,
        }
    }
}
