//! Object store abstraction.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use tubely_models::StorageKey;

use crate::error::StorageResult;

/// Key-addressed remote object store.
///
/// The upload pipeline and the read path only depend on this trait, so they
/// can run against an in-memory fake in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the full contents of a local file under `key`.
    async fn put_file(&self, path: &Path, key: &StorageKey, content_type: &str)
        -> StorageResult<()>;

    /// Signed GET URL valid for `expires_in` from now.
    async fn presign_get(&self, key: &StorageKey, expires_in: Duration) -> StorageResult<String>;

    /// Remove an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &StorageKey) -> StorageResult<()>;

    /// Confirm the store is reachable. Used by readiness checks.
    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }
}
