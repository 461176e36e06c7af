//! FastStart remuxing.
//!
//! Moves the MP4 `moov` atom to the front of the file so playback can start
//! before the download completes. Streams are copied, never re-encoded.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use tubely_models::{MediaType, PROCESSED_SUFFIX};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::MediaToolsConfig;
use crate::error::{MediaError, MediaResult};

/// Container-level repackaging for progressive playback.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Write a FastStart copy of `input` next to it and return its path.
    ///
    /// The input is left in place; deleting it is the caller's job.
    async fn remux_faststart(&self, input: &Path, media_type: MediaType) -> MediaResult<PathBuf>;
}

/// Sibling path of the remuxed output: `<stem>-processed.<ext>`.
pub fn processed_path(input: &Path, media_type: MediaType) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!(
        "{}{}.{}",
        stem,
        PROCESSED_SUFFIX,
        media_type.extension()
    ))
}

/// `Remuxer` backed by the ffmpeg CLI.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRemuxer {
    runner: FfmpegRunner,
}

impl FfmpegRemuxer {
    pub fn new(config: &MediaToolsConfig) -> Self {
        Self {
            runner: FfmpegRunner::new()
                .with_binary(&config.ffmpeg_path)
                .with_timeout(config.timeout),
        }
    }

    fn build_command(input: &Path, output: &Path, media_type: MediaType) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .movflags("faststart")
            .map_metadata(0)
            .stream_copy()
            .format(media_type.muxer())
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    async fn remux_faststart(&self, input: &Path, media_type: MediaType) -> MediaResult<PathBuf> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let output = processed_path(input, media_type);
        let cmd = Self::build_command(input, &output, media_type);
        let start = Instant::now();

        if let Err(e) = self.runner.run(&cmd).await {
            // ffmpeg may have created a truncated output before failing
            if let Err(rm) = tokio::fs::remove_file(&output).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %output.display(), error = %rm, "Failed to remove partial remux output");
                }
            }
            return Err(e);
        }

        if !tokio::fs::try_exists(&output).await? {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg reported success but produced no output",
                None,
                Some(0),
            ));
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "FastStart remux complete"
        );

        Ok(output)
    }
}
