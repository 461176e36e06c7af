//! Shared data models for the Tubely video service.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their owners
//! - Accepted upload media types and the upload policy
//! - Orientation classification of frame geometry
//! - Storage keys and locally staged assets

pub mod asset;
pub mod media_type;
pub mod orientation;
pub mod policy;
pub mod video;

// Re-export common types
pub use asset::{StagedAsset, StorageKey};
pub use media_type::MediaType;
pub use orientation::{classify, CanonicalRatio, Dimensions, OrientationCategory};
pub use policy::{
    MAX_VIDEO_UPLOAD_BYTES, PRESIGNED_URL_TTL, PROCESSED_SUFFIX, STORAGE_KEY_RANDOM_BYTES,
};
pub use video::{UserId, VideoId, VideoIdError, VideoRecord};
