//! Structured upload logging.

use tracing::{error, info, warn, Span};

use tubely_models::VideoId;

/// Logger carrying the video ID and operation of one upload.
#[derive(Debug, Clone)]
pub struct UploadLogger {
    video_id: String,
    operation: String,
}

impl UploadLogger {
    pub fn new(video_id: &VideoId, operation: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Upload started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Upload progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Upload warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Upload error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Upload completed: {}", message
        );
    }

    /// Span wrapping every event of this upload.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "upload",
            video_id = %self.video_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_logger_creation() {
        let video_id = VideoId::new();
        let logger = UploadLogger::new(&video_id, "video_upload");

        assert_eq!(logger.video_id, video_id.to_string());
        assert_eq!(logger.operation, "video_upload");
    }
}
