//! S3-compatible object storage.
//!
//! This crate provides:
//! - File upload to a bucket under orientation-prefixed keys
//! - Storage key generation with 128-bit random suffixes
//! - Presigned GET URL generation for playback
//! - The `ObjectStore` seam used by the upload pipeline

pub mod client;
pub mod error;
pub mod keys;
pub mod presign;
pub mod store;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use keys::{generate_storage_key, random_suffix};
pub use presign::PresignedUrlGenerator;
pub use store::ObjectStore;
