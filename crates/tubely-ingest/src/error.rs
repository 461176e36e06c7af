//! Upload pipeline error types.

use thiserror::Error;

use tubely_media::MediaError;
use tubely_storage::StorageError;

use crate::repository::RepositoryError;

pub type IngestResult<T> = Result<T, IngestError>;

/// Classified failure of one upload.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Bad content type or size. User-correctable.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Caller does not own the video, or it does not exist.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Another upload for the same video is still in flight.
    #[error("Upload conflict: {0}")]
    Conflict(String),

    /// Local staging failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remux failed (exit code {exit_code:?}): {message}")]
    Transcode {
        message: String,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl IngestError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Map a remux stage failure. Missing binaries and timeouts carry no exit code.
    pub fn from_remux(err: MediaError) -> Self {
        Self::Transcode {
            exit_code: err.exit_code(),
            stderr: err.stderr().map(str::to_string),
            message: err.to_string(),
        }
    }

    /// Map a probe stage failure.
    pub fn from_probe(err: MediaError) -> Self {
        match err.stderr() {
            Some(stderr) => Self::Probe(format!("{}: {}", err, stderr)),
            None => Self::Probe(err.to_string()),
        }
    }

    /// Pipeline stage that produced this error, used as a metrics label.
    pub fn stage(&self) -> &'static str {
        match self {
            IngestError::Validation(_) => "validation",
            IngestError::Authorization(_) => "authorization",
            IngestError::Conflict(_) => "conflict",
            IngestError::Io(_) => "staging",
            IngestError::Transcode { .. } => "remux",
            IngestError::Probe(_) => "probe",
            IngestError::Storage(_) => "storage",
            IngestError::Repository(_) => "repository",
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::Validation(_)
                | IngestError::Authorization(_)
                | IngestError::Conflict(_)
        )
    }
}
