//! Presigned playback URLs.

use std::sync::Arc;
use std::time::Duration;

use tubely_models::{StorageKey, VideoRecord, PRESIGNED_URL_TTL};

use crate::error::StorageResult;
use crate::store::ObjectStore;

/// Turns stored keys into short-lived signed URLs at read time.
///
/// Stateless: every call signs afresh and nothing is cached or persisted.
#[derive(Clone)]
pub struct PresignedUrlGenerator {
    store: Arc<dyn ObjectStore>,
    ttl: Duration,
}

impl PresignedUrlGenerator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            ttl: PRESIGNED_URL_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signed URL for a key.
    pub async fn url_for(&self, key: &StorageKey) -> StorageResult<String> {
        self.store.presign_get(key, self.ttl).await
    }

    /// Copy of `record` whose `video_url` is a signed URL instead of a key.
    ///
    /// Records without an uploaded video are returned unchanged.
    pub async fn sign_record(&self, record: &VideoRecord) -> StorageResult<VideoRecord> {
        let mut signed = record.clone();
        if let Some(stored) = record.video_url.as_deref() {
            let key = StorageKey::from_stored(stored);
            signed.video_url = Some(self.url_for(&key).await?);
        }
        Ok(signed)
    }
}
