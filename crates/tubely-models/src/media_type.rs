//! Accepted upload media types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Video container types accepted for upload.
///
/// Only MP4 is accepted; the FastStart remux relies on the MP4 `moov` atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MediaType {
    #[serde(rename = "video/mp4")]
    Mp4,
}

impl MediaType {
    /// Parse a declared content type.
    ///
    /// Matching ignores case and any parameters (`video/mp4; codecs=...`).
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "video/mp4" => Some(Self::Mp4),
            _ => None,
        }
    }

    /// MIME string used as the object store content-type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Mp4 => "video/mp4",
        }
    }

    /// File extension (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Mp4 => "mp4",
        }
    }

    /// Container format name passed to ffmpeg's `-f`.
    pub fn muxer(&self) -> &'static str {
        match self {
            MediaType::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
