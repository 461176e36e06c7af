//! Video upload pipeline.
//!
//! This crate provides:
//! - Upload validation (ownership, content type, size ceiling)
//! - Local staging of the raw upload with write-to-temp-then-rename
//! - Orchestration of remux, probe and object store handoff with
//!   guaranteed cleanup of every local artifact
//! - The `VideoRepository` collaborator trait and an in-memory implementation

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod repository;
pub mod stager;
pub mod validator;

pub use config::IngestConfig;
pub use error::{IngestError, IngestResult};
pub use logging::UploadLogger;
pub use pipeline::{UploadOutcome, UploadPipeline};
pub use repository::{
    InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoRepository,
};
pub use stager::LocalStager;
pub use validator::{UploadRequest, UploadValidator, ValidatedUpload};
