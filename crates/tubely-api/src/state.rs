//! Application state.

use std::sync::Arc;

use tubely_ingest::{IngestConfig, InMemoryVideoRepository, UploadPipeline, VideoRepository};
use tubely_media::{FfmpegRemuxer, FfprobeProbe, MediaProbe, MediaToolsConfig, Remuxer};
use tubely_storage::{ObjectStore, PresignedUrlGenerator, S3Client};

use crate::auth::JwtKeys;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub media: MediaToolsConfig,
    pub repository: Arc<dyn VideoRepository>,
    pub store: Arc<dyn ObjectStore>,
    pub pipeline: Arc<UploadPipeline>,
    pub presigner: PresignedUrlGenerator,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if config.jwt_secret.is_empty() {
            return Err("JWT_SECRET must be set".into());
        }

        let media = MediaToolsConfig::from_env();
        let ingest = IngestConfig::from_env();
        let storage = S3Client::from_env().await?;

        Ok(Self::from_parts(
            config,
            media.clone(),
            &ingest,
            Arc::new(InMemoryVideoRepository::new()),
            Arc::new(FfmpegRemuxer::new(&media)),
            Arc::new(FfprobeProbe::new(&media)),
            Arc::new(storage),
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn from_parts(
        config: ApiConfig,
        media: MediaToolsConfig,
        ingest: &IngestConfig,
        repository: Arc<dyn VideoRepository>,
        remuxer: Arc<dyn Remuxer>,
        probe: Arc<dyn MediaProbe>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let pipeline = UploadPipeline::new(
            ingest,
            Arc::clone(&repository),
            remuxer,
            probe,
            Arc::clone(&store),
        );
        let presigner =
            PresignedUrlGenerator::new(Arc::clone(&store)).with_ttl(config.presigned_url_ttl);
        let jwt = JwtKeys::new(&config.jwt_secret);

        Self {
            config,
            media,
            repository,
            store,
            pipeline: Arc::new(pipeline),
            presigner,
            jwt,
        }
    }
}
