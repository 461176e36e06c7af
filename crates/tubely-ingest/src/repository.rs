//! Video record persistence collaborator.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use tubely_models::{UserId, VideoId, VideoRecord};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Video not found: {0}")]
    NotFound(VideoId),

    #[error("Video already exists: {0}")]
    AlreadyExists(VideoId),

    #[error("Repository backend error: {0}")]
    Backend(String),
}

/// Persistence of video records.
///
/// The upload pipeline reads a record once and writes it back at most once,
/// after the processed file is confirmed in the object store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn get_video(&self, id: VideoId) -> RepositoryResult<Option<VideoRecord>>;

    async fn update_video(&self, record: &VideoRecord) -> RepositoryResult<()>;

    async fn create_video(&self, record: &VideoRecord) -> RepositoryResult<()>;

    /// Records owned by `user_id`, newest first.
    async fn list_videos_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<VideoRecord>>;
}

/// Process-local repository.
#[derive(Debug, Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<VideoId, VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: VideoId) -> RepositoryResult<Option<VideoRecord>> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_video(&self, record: &VideoRecord) -> RepositoryResult<()> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(record.id)),
        }
    }

    async fn create_video(&self, record: &VideoRecord) -> RepositoryResult<()> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&record.id) {
            return Err(RepositoryError::AlreadyExists(record.id));
        }
        videos.insert(record.id, record.clone());
        Ok(())
    }

    async fn list_videos_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<VideoRecord>> {
        let mut owned: Vec<VideoRecord> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
