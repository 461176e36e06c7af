//! Upload validation.
//!
//! Checks run in a fixed order: ownership, content type, declared size.
//! Ownership comes first so a caller who does not own the video learns
//! nothing else about it, and no body byte is read before it passes.

use std::sync::Arc;

use tubely_models::{MediaType, UserId, VideoId, VideoRecord};

use crate::error::{IngestError, IngestResult};
use crate::repository::VideoRepository;

/// What the caller claims about an upload, before any byte is read.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub video_id: VideoId,
    pub caller: UserId,
    pub content_type: String,
    /// Declared size, if the transport announced one
    pub declared_size: Option<u64>,
}

/// An upload that passed every pre-staging check.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub record: VideoRecord,
    pub media_type: MediaType,
}

pub struct UploadValidator {
    repository: Arc<dyn VideoRepository>,
    max_upload_bytes: u64,
}

impl UploadValidator {
    pub fn new(repository: Arc<dyn VideoRepository>, max_upload_bytes: u64) -> Self {
        Self {
            repository,
            max_upload_bytes,
        }
    }

    /// Load the record and confirm `caller` owns it.
    ///
    /// A missing record and a record owned by someone else fail identically.
    pub async fn authorize(&self, caller: &UserId, video_id: VideoId) -> IngestResult<VideoRecord> {
        match self.repository.get_video(video_id).await? {
            Some(record) if record.is_owned_by(caller) => Ok(record),
            _ => Err(IngestError::authorization("Not authorized to update this video")),
        }
    }

    pub fn check_content_type(&self, content_type: &str) -> IngestResult<MediaType> {
        MediaType::from_content_type(content_type).ok_or_else(|| {
            IngestError::validation(format!(
                "Invalid file type {:?}, only {} is allowed",
                content_type,
                MediaType::Mp4.as_str()
            ))
        })
    }

    pub fn check_declared_size(&self, declared_size: Option<u64>) -> IngestResult<()> {
        match declared_size {
            Some(size) if size > self.max_upload_bytes => Err(IngestError::validation(format!(
                "Upload of {} bytes exceeds the {} byte limit",
                size, self.max_upload_bytes
            ))),
            _ => Ok(()),
        }
    }

    /// Run every pre-staging check. Has no side effects.
    pub async fn validate(&self, request: &UploadRequest) -> IngestResult<ValidatedUpload> {
        let record = self.authorize(&request.caller, request.video_id).await?;
        let media_type = self.check_content_type(&request.content_type)?;
        self.check_declared_size(request.declared_size)?;

        Ok(ValidatedUpload { record, media_type })
    }
}
