//! Local staging of raw uploads.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use tubely_models::{MediaType, StagedAsset, VideoId};

use crate::error::{IngestError, IngestResult};

/// Writes uploads into a scratch directory.
///
/// Bytes go to a hidden temp file in the same directory, which is renamed to
/// `<video_id>.<ext>` only once the stream has ended cleanly. Any failure
/// drops the temp file, so a staging call either returns a complete file or
/// leaves nothing behind.
#[derive(Debug, Clone)]
pub struct LocalStager {
    root: PathBuf,
    max_bytes: u64,
}

impl LocalStager {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Deterministic staging path for a video.
    pub fn staged_path(&self, video_id: VideoId, media_type: MediaType) -> PathBuf {
        self.root
            .join(format!("{}.{}", video_id, media_type.extension()))
    }

    /// Stream `body` to disk, enforcing the size ceiling as bytes arrive.
    pub async fn stage<S>(
        &self,
        video_id: VideoId,
        media_type: MediaType,
        body: S,
    ) -> IngestResult<StagedAsset>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        tokio::fs::create_dir_all(&self.root).await?;

        let temp = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(&self.root)?;
        let (std_file, temp_path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(std_file);

        tokio::pin!(body);
        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(IngestError::validation(format!(
                    "Upload exceeds the {} byte limit",
                    self.max_bytes
                )));
            }
            file.write_all(&chunk).await?;
        }

        if written == 0 {
            return Err(IngestError::validation("Uploaded file is empty"));
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let final_path = self.staged_path(video_id, media_type);
        temp_path.persist(&final_path).map_err(|e| e.error)?;

        debug!(
            video_id = %video_id,
            path = %final_path.display(),
            size_bytes = written,
            "Staged upload"
        );

        Ok(StagedAsset {
            path: final_path,
            media_type,
            size_bytes: written,
        })
    }
}
