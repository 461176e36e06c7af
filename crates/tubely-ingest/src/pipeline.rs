//! Upload orchestration.
//!
//! Validator -> Stager -> Remuxer -> Probe (on the remuxed file) ->
//! object store -> repository. Every local file created along the way is
//! registered with a scope guard and removed on every exit path, including
//! cancellation of the request future.
//!
//! Scratch paths are derived from the video id, so only one upload per video
//! may be in flight at a time; a second one is rejected with a conflict.

use bytes::Bytes;
use futures_util::Stream;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{warn, Instrument};

use tubely_media::{probe_orientation, processed_path, MediaProbe, Remuxer};
use tubely_models::{Dimensions, OrientationCategory, StorageKey, VideoId, VideoRecord};
use tubely_storage::{generate_storage_key, ObjectStore};

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::logging::UploadLogger;
use crate::metrics as upload_metrics;
use crate::repository::VideoRepository;
use crate::stager::LocalStager;
use crate::validator::{UploadRequest, UploadValidator, ValidatedUpload};

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Record as persisted, pointing at `key`
    pub record: VideoRecord,
    pub key: StorageKey,
    pub dimensions: Dimensions,
    pub orientation: OrientationCategory,
    pub size_bytes: u64,
}

pub struct UploadPipeline {
    validator: UploadValidator,
    stager: LocalStager,
    remuxer: Arc<dyn Remuxer>,
    probe: Arc<dyn MediaProbe>,
    store: Arc<dyn ObjectStore>,
    repository: Arc<dyn VideoRepository>,
    in_flight: Mutex<HashSet<VideoId>>,
}

impl UploadPipeline {
    pub fn new(
        config: &IngestConfig,
        repository: Arc<dyn VideoRepository>,
        remuxer: Arc<dyn Remuxer>,
        probe: Arc<dyn MediaProbe>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            validator: UploadValidator::new(repository.clone(), config.max_upload_bytes),
            stager: LocalStager::new(&config.assets_root, config.max_upload_bytes),
            remuxer,
            probe,
            store,
            repository,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Mark `video_id` as having an upload in progress.
    ///
    /// Returns false if another upload already holds it.
    fn try_claim(&self, video_id: VideoId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(video_id)
    }

    fn release(&self, video_id: VideoId) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&video_id);
    }

    /// Process one upload end to end.
    ///
    /// `body` is not polled until validation has passed. Errors are returned
    /// exactly as the failing stage produced them, after cleanup.
    pub async fn run<S>(&self, request: UploadRequest, body: S) -> IngestResult<UploadOutcome>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        let logger = UploadLogger::new(&request.video_id, "video_upload");
        let span = logger.create_span();

        async move {
            let start = Instant::now();
            logger.log_start(&format!("user {}", request.caller));

            let result = self.execute(&logger, request, body).await;
            let elapsed = start.elapsed().as_secs_f64();

            match &result {
                Ok(outcome) => {
                    upload_metrics::record_upload_success(outcome.orientation.as_str(), elapsed);
                    logger.log_completion(outcome.key.as_str());
                }
                Err(e) => {
                    upload_metrics::record_upload_failure(e.stage(), elapsed);
                    if e.is_client_error() {
                        logger.log_warning(&e.to_string());
                    } else {
                        logger.log_error(&e.to_string());
                    }
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn execute<S>(
        &self,
        logger: &UploadLogger,
        request: UploadRequest,
        body: S,
    ) -> IngestResult<UploadOutcome>
    where
        S: Stream<Item = io::Result<Bytes>> + Send,
    {
        let ValidatedUpload {
            mut record,
            media_type,
        } = self.validator.validate(&request).await?;

        if !self.try_claim(request.video_id) {
            return Err(IngestError::conflict(
                "Another upload for this video is in progress",
            ));
        }
        // Declared before the scratch guard so files are gone before release
        let _claim = scopeguard::guard(request.video_id, |id| self.release(id));

        let mut scratch = scopeguard::guard(Vec::<PathBuf>::new(), remove_scratch_files);

        let stage_start = Instant::now();
        let staged = self.stager.stage(request.video_id, media_type, body).await?;
        scratch.push(staged.path.clone());
        upload_metrics::record_stage_duration("staging", stage_start.elapsed().as_secs_f64());
        upload_metrics::record_staged_bytes(staged.size_bytes);
        logger.log_progress(&format!("staged {} bytes", staged.size_bytes));

        // Registered before the remux starts so partial output never survives
        let expected = processed_path(&staged.path, media_type);
        scratch.push(expected.clone());

        let stage_start = Instant::now();
        let remuxed = self
            .remuxer
            .remux_faststart(&staged.path, media_type)
            .await
            .map_err(IngestError::from_remux)?;
        if remuxed != expected {
            scratch.push(remuxed.clone());
        }
        upload_metrics::record_stage_duration("remux", stage_start.elapsed().as_secs_f64());

        // The remuxed copy is confirmed, the original is no longer needed
        if let Err(e) = tokio::fs::remove_file(&staged.path).await {
            warn!(path = %staged.path.display(), error = %e, "Failed to remove staged original");
        }

        let stage_start = Instant::now();
        let (dimensions, orientation) = probe_orientation(self.probe.as_ref(), &remuxed)
            .await
            .map_err(IngestError::from_probe)?;
        upload_metrics::record_stage_duration("probe", stage_start.elapsed().as_secs_f64());
        logger.log_progress(&format!(
            "{} classified as {}",
            dimensions,
            orientation.as_str()
        ));

        let key = generate_storage_key(orientation, media_type);
        let stage_start = Instant::now();
        self.store
            .put_file(&remuxed, &key, media_type.as_str())
            .await?;
        upload_metrics::record_stage_duration("storage", stage_start.elapsed().as_secs_f64());
        logger.log_progress(&format!("stored as {}", key));

        record.assign_storage_key(&key);
        if let Err(e) = self.repository.update_video(&record).await {
            // The object is unreferenced; remove it rather than leak it
            if let Err(delete_err) = self.store.delete(&key).await {
                warn!(key = %key, error = %delete_err, "Failed to remove unreferenced object");
            }
            return Err(e.into());
        }

        Ok(UploadOutcome {
            record,
            key,
            dimensions,
            orientation,
            size_bytes: staged.size_bytes,
        })
    }
}

fn remove_scratch_files(paths: Vec<PathBuf>) {
    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove scratch file"),
        }
    }
}
