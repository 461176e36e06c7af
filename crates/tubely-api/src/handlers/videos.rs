//! Video API handlers.

use std::io;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use tubely_ingest::UploadRequest;
use tubely_models::{VideoId, VideoRecord};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying the video bytes.
const VIDEO_FIELD: &str = "video";

/// Room left for multipart boundaries, part headers and small form fields
/// when inferring the file size from the request `Content-Length`.
const MULTIPART_ENVELOPE_ALLOWANCE: u64 = 64 * 1024;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
}

#[derive(Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
}

fn parse_video_id(raw: &str) -> ApiResult<VideoId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))
}

/// Create a draft video record owned by the caller.
pub async fn create_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVideoRequest>,
) -> ApiResult<(StatusCode, Json<VideoRecord>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let record = VideoRecord::new(user.user_id, request.title, request.description);
    state.repository.create_video(&record).await?;

    info!(video_id = %record.id, user_id = %record.user_id, "Created video record");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Get one of the caller's videos, with a fresh playback URL.
///
/// Videos owned by someone else are reported as not found.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = parse_video_id(&video_id)?;

    let record = state
        .repository
        .get_video(video_id)
        .await?
        .filter(|r| r.is_owned_by(&user.user_id))
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(Json(state.presigner.sign_record(&record).await?))
}

/// List the caller's videos, newest first, with fresh playback URLs.
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<VideoListResponse>> {
    let records = state.repository.list_videos_by_user(&user.user_id).await?;

    let mut videos = Vec::with_capacity(records.len());
    for record in &records {
        videos.push(state.presigner.sign_record(record).await?);
    }

    Ok(Json(VideoListResponse { videos }))
}

/// Upload the video file for a record.
///
/// The request `Content-Length`, less the multipart envelope allowance, is a
/// lower bound on the file size. It lets clearly oversized uploads fail before
/// the body is consumed; the stager enforces the exact ceiling while streaming.
pub async fn upload_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = parse_video_id(&video_id)?;

    let declared_size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(|len| len.saturating_sub(MULTIPART_ENVELOPE_ALLOWANCE));

    info!(video_id = %video_id, user_id = %user.user_id, "Uploading video");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let request = UploadRequest {
            video_id,
            caller: user.user_id.clone(),
            content_type: field.content_type().unwrap_or_default().to_string(),
            declared_size,
        };
        let body = field.map_err(|e| io::Error::other(e.body_text()));

        let outcome = state.pipeline.run(request, body).await?;
        let signed = state.presigner.sign_record(&outcome.record).await?;
        return Ok(Json(signed));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart field {:?}",
        VIDEO_FIELD
    )))
}
