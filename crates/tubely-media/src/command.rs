//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Copy every stream without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-codec").output_arg("copy")
    }

    /// Set muxer flags (e.g. `faststart`).
    pub fn movflags(self, flags: impl Into<String>) -> Self {
        self.output_arg("-movflags").output_arg(flags)
    }

    /// Carry global metadata over from the given input.
    pub fn map_metadata(self, input_index: u32) -> Self {
        self.output_arg("-map_metadata")
            .output_arg(input_index.to_string())
    }

    /// Force the output container format.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Build the command arguments.
    ///
    /// Always overwrites the output and logs errors only, so stderr holds
    /// nothing but the failure reason.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// FFmpeg binary
    binary: PathBuf,
    /// Optional deadline
    timeout: Option<Duration>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner using `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            timeout: None,
        }
    }

    /// Use a specific FFmpeg binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.binary.display(), args.join(" "));

        let mut command = Command::new(&self.binary);
        command.args(&args);

        let output = run_tool(command, "ffmpeg", self.timeout)
            .await
            .map_err(|e| match e {
                MediaError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    MediaError::FfmpegNotFound(self.binary.display().to_string())
                }
                other => other,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                stderr_text(&output),
                output.status.code(),
            ))
        }
    }
}

/// Spawn a tool, wait for it, and capture its output.
///
/// The child is killed if the deadline elapses or the returned future is
/// dropped before the process exits.
pub(crate) async fn run_tool(
    mut command: Command,
    tool: &'static str,
    timeout: Option<Duration>,
) -> MediaResult<Output> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let wait = child.wait_with_output();

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("{} timed out after {} seconds, killing process", tool, limit.as_secs());
                return Err(MediaError::Timeout {
                    tool,
                    secs: limit.as_secs(),
                });
            }
        },
        None => wait.await?,
    };

    Ok(output)
}

pub(crate) fn stderr_text(output: &Output) -> Option<String> {
    let text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg(binary: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let binary = binary.as_ref();
    which::which(binary).map_err(|_| MediaError::FfmpegNotFound(binary.display().to_string()))
}

/// Check if FFprobe is available.
pub fn check_ffprobe(binary: impl AsRef<Path>) -> MediaResult<PathBuf> {
    let binary = binary.as_ref();
    which::which(binary).map_err(|_| MediaError::FfprobeNotFound(binary.display().to_string()))
}
