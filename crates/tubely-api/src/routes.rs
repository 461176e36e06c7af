//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{create_video, get_video, health, list_videos, ready, upload_video};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        .route("/videos", post(create_video).get(list_videos))
        .route("/videos/:video_id", get(get_video))
        // SECURITY: Request body size limit for JSON routes
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size));

    // Upload size is enforced by the ingest pipeline while streaming
    let upload_routes = Router::new()
        .route("/video_upload/:video_id", post(upload_video))
        .layer(DefaultBodyLimit::disable());

    let api_routes = Router::new().merge(video_routes).merge(upload_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use tubely_ingest::{IngestConfig, InMemoryVideoRepository, VideoRepository};
    use tubely_media::{processed_path, MediaProbe, MediaResult, MediaToolsConfig, Remuxer};
    use tubely_models::{Dimensions, MediaType, StorageKey, UserId, VideoRecord};
    use tubely_storage::{ObjectStore, StorageResult};

    use crate::config::ApiConfig;

    const SECRET: &str = "router-test-secret";
    const BOUNDARY: &str = "tubely-test-boundary";

    struct CopyRemuxer;

    #[async_trait]
    impl Remuxer for CopyRemuxer {
        async fn remux_faststart(&self, input: &Path, media_type: MediaType) -> MediaResult<PathBuf> {
            let output = processed_path(input, media_type);
            tokio::fs::copy(input, &output).await?;
            Ok(output)
        }
    }

    struct FixedProbe(Dimensions);

    #[async_trait]
    impl MediaProbe for FixedProbe {
        async fn probe_dimensions(&self, _path: &Path) -> MediaResult<Dimensions> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put_file(&self, path: &Path, key: &StorageKey, _content_type: &str) -> StorageResult<()> {
            let bytes = tokio::fs::read(path).await?;
            self.objects.lock().unwrap().insert(key.to_string(), bytes);
            Ok(())
        }

        async fn presign_get(&self, key: &StorageKey, expires_in: Duration) -> StorageResult<String> {
            Ok(format!(
                "https://store.test/{}?X-Amz-Expires={}",
                key,
                expires_in.as_secs()
            ))
        }

        async fn delete(&self, key: &StorageKey) -> StorageResult<()> {
            self.objects.lock().unwrap().remove(key.as_str());
            Ok(())
        }
    }

    struct TestApp {
        router: Router,
        state: AppState,
        repo: Arc<InMemoryVideoRepository>,
        store: Arc<MemoryStore>,
        assets: TempDir,
    }

    impl TestApp {
        fn new(dimensions: Dimensions) -> Self {
            let assets = TempDir::new().unwrap();
            let config = ApiConfig {
                jwt_secret: SECRET.to_string(),
                ..ApiConfig::default()
            };
            let ingest = IngestConfig {
                assets_root: assets.path().to_path_buf(),
                max_upload_bytes: 1024,
            };
            let repo = Arc::new(InMemoryVideoRepository::new());
            let store = Arc::new(MemoryStore::default());

            let state = AppState::from_parts(
                config,
                MediaToolsConfig::default(),
                &ingest,
                repo.clone(),
                Arc::new(CopyRemuxer),
                Arc::new(FixedProbe(dimensions)),
                store.clone(),
            );

            Self {
                router: create_router(state.clone(), None),
                state,
                repo,
                store,
                assets,
            }
        }

        fn token(&self, user: &str) -> String {
            self.state
                .jwt
                .issue(&UserId::new(user), Duration::from_secs(300))
                .unwrap()
        }

        async fn seed_video(&self, owner: &str) -> VideoRecord {
            let record = VideoRecord::new(UserId::new(owner), "Clip", "");
            self.repo.create_video(&record).await.unwrap();
            record
        }

        fn assets_empty(&self) -> bool {
            std::fs::read_dir(self.assets.path()).unwrap().next().is_none()
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
            (status, json)
        }
    }

    fn multipart_body(content_type: &str, payload: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(video_id: &str, token: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
        let body = multipart_body(content_type, payload);
        Request::builder()
            .method("POST")
            .uri(format!("/api/video_upload/{}", video_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new(Dimensions::new(1920, 1080));
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["X-Content-Type-Options"], "nosniff");
        assert!(response.headers().contains_key("X-Request-ID"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = TestApp::new(Dimensions::new(1920, 1080));
        let (status, body) = app
            .send(Request::get("/api/videos").body(Body::empty()).unwrap())
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["detail"].as_str().unwrap().contains("Authorization"));
    }

    #[tokio::test]
    async fn test_create_and_list_videos() {
        let app = TestApp::new(Dimensions::new(1920, 1080));
        let token = app.token("owner");

        let (status, created) = app
            .send(
                Request::post("/api/videos")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title":"Boots","description":"A demo"}"#))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Boots");
        assert_eq!(created["user_id"], "owner");
        assert!(created.get("video_url").is_none());

        let (status, listed) = app
            .send(
                Request::get("/api/videos")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["videos"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_video_rejects_empty_title() {
        let app = TestApp::new(Dimensions::new(1920, 1080));
        let (status, _) = app
            .send(
                Request::post("/api/videos")
                    .header(header::AUTHORIZATION, format!("Bearer {}", app.token("owner")))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title":""}"#))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_portrait_video() {
        let app = TestApp::new(Dimensions::new(720, 1280));
        let record = app.seed_video("owner").await;

        let (status, body) = app
            .send(upload_request(
                &record.id.to_string(),
                &app.token("owner"),
                "video/mp4",
                b"ftypmoovmdat",
            ))
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let url = body["video_url"].as_str().unwrap();
        assert!(url.starts_with("https://store.test/portrait/"));
        assert!(url.ends_with("-processed.mp4?X-Amz-Expires=3600"));

        // The stored record holds the key, never the signed URL
        let stored = app.repo.get_video(record.id).await.unwrap().unwrap();
        let key = stored.video_url.unwrap();
        assert!(key.starts_with("portrait/"));
        assert_eq!(
            app.store.objects.lock().unwrap().get(&key).map(Vec::as_slice),
            Some(&b"ftypmoovmdat"[..])
        );
        assert!(app.assets_empty());

        let (status, fetched) = app
            .send(
                Request::get(format!("/api/videos/{}", record.id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", app.token("owner")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(fetched["video_url"]
            .as_str()
            .unwrap()
            .starts_with(&format!("https://store.test/{}", key)));
    }

    #[tokio::test]
    async fn test_upload_by_non_owner_is_forbidden() {
        let app = TestApp::new(Dimensions::new(720, 1280));
        let record = app.seed_video("owner").await;

        let (status, body) = app
            .send(upload_request(
                &record.id.to_string(),
                &app.token("intruder"),
                "video/mp4",
                b"ftypmoovmdat",
            ))
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "authorization");
        assert!(app.assets_empty());
        assert!(app.store.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_wrong_type_is_bad_request() {
        let app = TestApp::new(Dimensions::new(720, 1280));
        let record = app.seed_video("owner").await;

        let (status, body) = app
            .send(upload_request(
                &record.id.to_string(),
                &app.token("owner"),
                "video/quicktime",
                b"moov",
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
        assert!(app.assets_empty());
    }

    #[tokio::test]
    async fn test_upload_over_ceiling_writes_nothing() {
        let app = TestApp::new(Dimensions::new(720, 1280));
        let record = app.seed_video("owner").await;

        let (status, _) = app
            .send(upload_request(
                &record.id.to_string(),
                &app.token("owner"),
                "video/mp4",
                &[0u8; 4096],
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.assets_empty());
        let stored = app.repo.get_video(record.id).await.unwrap().unwrap();
        assert!(stored.video_url.is_none());
    }

    #[tokio::test]
    async fn test_upload_exactly_at_ceiling_is_accepted() {
        let app = TestApp::new(Dimensions::new(1920, 1080));
        let record = app.seed_video("owner").await;

        // The request is larger than the ceiling, the file is not
        let payload = [7u8; 1024];
        let (status, body) = app
            .send(upload_request(
                &record.id.to_string(),
                &app.token("owner"),
                "video/mp4",
                &payload,
            ))
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let stored = app.repo.get_video(record.id).await.unwrap().unwrap();
        let key = stored.video_url.unwrap();
        assert!(key.starts_with("landscape/"));
        assert_eq!(app.store.objects.lock().unwrap()[&key].len(), 1024);
        assert!(app.assets_empty());
    }

    #[tokio::test]
    async fn test_upload_one_byte_over_ceiling_is_rejected() {
        let app = TestApp::new(Dimensions::new(1920, 1080));
        let record = app.seed_video("owner").await;

        let (status, body) = app
            .send(upload_request(
                &record.id.to_string(),
                &app.token("owner"),
                "video/mp4",
                &[7u8; 1025],
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
        assert!(app.assets_empty());
        assert!(app.store.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_invalid_video_id() {
        let app = TestApp::new(Dimensions::new(720, 1280));
        let (status, _) = app
            .send(upload_request("not-a-uuid", &app.token("owner"), "video/mp4", b"x"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_users_video_is_not_found() {
        let app = TestApp::new(Dimensions::new(720, 1280));
        let record = app.seed_video("owner").await;

        let (status, _) = app
            .send(
                Request::get(format!("/api/videos/{}", record.id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", app.token("intruder")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
