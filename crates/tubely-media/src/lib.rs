//! FFmpeg CLI wrapper for upload processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Subprocess execution with an optional external deadline
//! - FastStart remuxing (container repackaging, no re-encoding)
//! - FFprobe geometry probing and orientation classification
//! - The `Remuxer` and `MediaProbe` seams used by the upload pipeline

pub mod command;
pub mod config;
pub mod error;
pub mod probe;
pub mod remux;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::MediaToolsConfig;
pub use error::{MediaError, MediaResult};
pub use probe::{parse_dimensions, probe_orientation, FfprobeProbe, MediaProbe};
pub use remux::{processed_path, FfmpegRemuxer, Remuxer};
