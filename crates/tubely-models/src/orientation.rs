//! Orientation classification of frame geometry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute tolerance when matching a ratio against a canonical one.
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Pixel dimensions of the primary video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, `None` for a zero height.
    pub fn ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }

    /// Orientation category of these dimensions.
    pub fn orientation(&self) -> OrientationCategory {
        classify(self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Coarse orientation of a video, embedded as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrientationCategory {
    Landscape,
    Portrait,
    /// Square frames and anything without a canonical match.
    Other,
}

impl OrientationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationCategory::Landscape => "landscape",
            OrientationCategory::Portrait => "portrait",
            OrientationCategory::Other => "other",
        }
    }

    /// Storage key prefix, including the trailing separator.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            OrientationCategory::Landscape => "landscape/",
            OrientationCategory::Portrait => "portrait/",
            OrientationCategory::Other => "other/",
        }
    }
}

impl fmt::Display for OrientationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical aspect ratios recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalRatio {
    Widescreen,
    Vertical,
    Standard,
    StandardVertical,
    Square,
}

impl CanonicalRatio {
    /// Checked in this order; the first match within tolerance wins.
    pub const ALL: [CanonicalRatio; 5] = [
        CanonicalRatio::Widescreen,
        CanonicalRatio::Vertical,
        CanonicalRatio::Standard,
        CanonicalRatio::StandardVertical,
        CanonicalRatio::Square,
    ];

    pub fn value(&self) -> f64 {
        match self {
            CanonicalRatio::Widescreen => 16.0 / 9.0,
            CanonicalRatio::Vertical => 9.0 / 16.0,
            CanonicalRatio::Standard => 4.0 / 3.0,
            CanonicalRatio::StandardVertical => 3.0 / 4.0,
            CanonicalRatio::Square => 1.0,
        }
    }

    pub fn category(&self) -> OrientationCategory {
        match self {
            CanonicalRatio::Widescreen | CanonicalRatio::Standard => OrientationCategory::Landscape,
            CanonicalRatio::Vertical | CanonicalRatio::StandardVertical => {
                OrientationCategory::Portrait
            }
            CanonicalRatio::Square => OrientationCategory::Other,
        }
    }

    /// Canonical ratio matching `ratio` within [`ASPECT_TOLERANCE`], if any.
    pub fn matching(ratio: f64) -> Option<CanonicalRatio> {
        Self::ALL
            .into_iter()
            .find(|c| (ratio - c.value()).abs() < ASPECT_TOLERANCE)
    }
}

/// Classify frame geometry into an orientation category.
///
/// Pure and total: a zero height or a ratio with no canonical match is
/// `Other`, as is an exact square.
pub fn classify(width: u32, height: u32) -> OrientationCategory {
    Dimensions::new(width, height)
        .ratio()
        .and_then(CanonicalRatio::matching)
        .map(|c| c.category())
        .unwrap_or(OrientationCategory::Other)
}
