//! Upload and delivery policy constants.

use std::time::Duration;

/// Upload size ceiling for videos (1 GiB).
pub const MAX_VIDEO_UPLOAD_BYTES: u64 = 1 << 30;

/// Validity window of a presigned playback URL.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Suffix appended to remuxed file names and storage keys.
pub const PROCESSED_SUFFIX: &str = "-processed";

/// Bytes of randomness in a storage key suffix (128 bits).
pub const STORAGE_KEY_RANDOM_BYTES: usize = 16;
