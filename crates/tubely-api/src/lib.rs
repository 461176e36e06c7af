//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video record creation and listing with presigned playback URLs
//! - Multipart video upload into the ingest pipeline
//! - Bearer JWT identity extraction
//! - Security headers, request IDs and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
