//! Video record models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::asset::StorageKey;

/// Unique identifier for a video record.
///
/// Always a UUID, so it is safe to embed in local file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub Uuid);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = VideoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| VideoIdError::Invalid(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum VideoIdError {
    #[error("Invalid video ID: {0}")]
    Invalid(String),
}

/// Identifier of an authenticated user, as resolved by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video record owned by the persistence layer.
///
/// The upload pipeline only ever touches `video_url`, and only after the
/// processed file is confirmed in the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub id: VideoId,

    /// Owning user
    pub user_id: UserId,

    /// Video title
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Thumbnail location (managed outside the video pipeline)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Storage key of the processed video, or a presigned URL in API responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a new draft record with no uploaded video.
    pub fn new(user_id: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user owns this record.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Point the record at a newly stored object.
    pub fn assign_storage_key(&mut self, key: &StorageKey) {
        self.video_url = Some(key.as_str().to_string());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::OrientationCategory;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_video_id_parse() {
        let id = VideoId::new();
        let parsed: VideoId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        assert!("../../etc/passwd".parse::<VideoId>().is_err());
        assert!("".parse::<VideoId>().is_err());
    }

    #[test]
    fn test_assign_storage_key_keeps_identity() {
        let owner = UserId::new("user-1");
        let mut record = VideoRecord::new(owner.clone(), "Title", "Desc");
        let before = record.clone();

        let key = StorageKey::compose(OrientationCategory::Portrait, "ab".repeat(16), "mp4");
        record.assign_storage_key(&key);

        assert_eq!(record.id, before.id);
        assert_eq!(record.user_id, owner);
        assert_eq!(record.video_url.as_deref(), Some(key.as_str()));
        assert!(record.updated_at >= before.updated_at);
    }

    #[test]
    fn test_ownership() {
        let record = VideoRecord::new(UserId::new("alice"), "t", "d");
        assert!(record.is_owned_by(&UserId::new("alice")));
        assert!(!record.is_owned_by(&UserId::new("bob")));
    }

    #[test]
    fn test_draft_serialization() {
        let record = VideoRecord::new(UserId::new("alice"), "Boots", "");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["user_id"], "alice");
        assert_eq!(json["id"], record.id.to_string());
        assert!(json.get("video_url").is_none());

        let back: VideoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_schema_describes_ids_as_uuids() {
        let schema = serde_json::to_value(schemars::schema_for!(VideoRecord)).unwrap();

        assert_eq!(schema["properties"]["id"]["type"], "string");
        assert_eq!(schema["properties"]["id"]["format"], "uuid");
        assert!(schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "user_id"));
    }
}
