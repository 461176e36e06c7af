//! Upload pipeline metrics.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const UPLOADS_TOTAL: &str = "tubely_uploads_total";
    pub const UPLOAD_DURATION_SECONDS: &str = "tubely_upload_duration_seconds";
    pub const STAGE_DURATION_SECONDS: &str = "tubely_upload_stage_duration_seconds";
    pub const UPLOADED_BYTES_TOTAL: &str = "tubely_uploaded_bytes_total";
}

/// Record a successful upload.
pub fn record_upload_success(orientation: &str, duration_secs: f64) {
    let labels = [
        ("outcome", "success".to_string()),
        ("orientation", orientation.to_string()),
    ];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
    histogram!(names::UPLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed upload.
pub fn record_upload_failure(stage: &str, duration_secs: f64) {
    let labels = [
        ("outcome", "failure".to_string()),
        ("stage", stage.to_string()),
    ];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
    histogram!(names::UPLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record the duration of one pipeline stage.
pub fn record_stage_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record bytes staged from a client.
pub fn record_staged_bytes(bytes: u64) {
    counter!(names::UPLOADED_BYTES_TOTAL).increment(bytes);
}
