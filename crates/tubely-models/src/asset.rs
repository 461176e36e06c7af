//! Local staged assets and remote storage keys.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::media_type::MediaType;
use crate::orientation::OrientationCategory;
use crate::policy::PROCESSED_SUFFIX;

/// A raw upload persisted to local scratch storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    /// Final path of the staged file
    pub path: PathBuf,
    /// Declared media type
    pub media_type: MediaType,
    /// Bytes written
    pub size_bytes: u64,
}

/// Object store key of a processed video.
///
/// Layout: `<orientation>/<random hex>-processed.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Build a key from its parts. The caller supplies the random suffix.
    pub fn compose(
        orientation: OrientationCategory,
        random_hex: impl AsRef<str>,
        extension: &str,
    ) -> Self {
        Self(format!(
            "{}{}{}.{}",
            orientation.key_prefix(),
            random_hex.as_ref(),
            PROCESSED_SUFFIX,
            extension
        ))
    }

    /// Wrap a key read back from persistence.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Orientation encoded in the key prefix, if recognisable.
    pub fn orientation(&self) -> Option<OrientationCategory> {
        [
            OrientationCategory::Landscape,
            OrientationCategory::Portrait,
            OrientationCategory::Other,
        ]
        .into_iter()
        .find(|o| self.0.starts_with(o.key_prefix()))
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
