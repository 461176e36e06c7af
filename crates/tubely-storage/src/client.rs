//! S3 client implementation.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, error, info};

use tubely_models::StorageKey;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Bucket name
    pub bucket_name: String,
    /// Region
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    pub endpoint_url: Option<String>,
    /// Static access key ID; the default credential chain is used when unset
    pub access_key_id: Option<String>,
    /// Static secret access key
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            bucket_name: std::env::var("S3_BUCKET")
                .map_err(|_| StorageError::config_error("S3_BUCKET not set"))?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok().filter(|s| !s.is_empty()),
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
        })
    }
}

/// S3 storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new client from configuration.
    ///
    /// SDK retries are disabled: every storage operation is a single attempt
    /// and retrying is left to the caller.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let region = Region::new(config.region.clone());

        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials = Credentials::new(key_id, secret, None, None, "tubely-static");
                Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
            }
            (None, None) => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Builder::from(&shared)
            }
            _ => {
                return Err(StorageError::config_error(
                    "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together",
                ))
            }
        };

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let sdk_config = builder.retry_config(RetryConfig::disabled()).build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }

    /// Bucket this client writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload a file.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        let start = Instant::now();
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let detail = DisplayErrorContext(&e).to_string();
                error!(
                    bucket = %self.bucket,
                    key = %key,
                    error = %detail,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "S3 upload failed"
                );
                StorageError::upload_failed(detail)
            })?;

        info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 upload successful"
        );
        Ok(())
    }

    /// Generate a presigned GET URL valid from `start` for `expires_in`.
    pub async fn presign_get_at(
        &self,
        key: &str,
        expires_in: Duration,
        start: SystemTime,
    ) -> StorageResult<String> {
        let presign_config = PresigningConfig::builder()
            .start_time(start)
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::presign_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Delete an object.
    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(DisplayErrorContext(&e).to_string()))
                }
            }
        }
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::AwsSdk(format!(
                    "S3 connectivity check failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_file(
        &self,
        path: &Path,
        key: &StorageKey,
        content_type: &str,
    ) -> StorageResult<()> {
        self.upload_file(path, key.as_str(), content_type).await
    }

    async fn presign_get(&self, key: &StorageKey, expires_in: Duration) -> StorageResult<String> {
        self.presign_get_at(key.as_str(), expires_in, SystemTime::now())
            .await
    }

    async fn delete(&self, key: &StorageKey) -> StorageResult<()> {
        self.delete_object(key.as_str()).await
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        S3Client::check_connectivity(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BUCKET: &str = "test-bucket";

    async fn test_client(endpoint: &str) -> S3Client {
        S3Client::new(S3Config {
            bucket_name: BUCKET.to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: Some(endpoint.to_string()),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        })
        .await
        .unwrap()
    }

    async fn temp_video() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("clip-processed.mp4");
        tokio::fs::write(&file, b"fake mp4 payload").await.unwrap();
        (dir, file)
    }

    #[tokio::test]
    async fn test_put_file_sends_key_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/test-bucket/portrait/abc-processed.mp4"))
            .and(header("content-type", "video/mp4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).await;
        let (_dir, file) = temp_video().await;
        let key = StorageKey::from_stored("portrait/abc-processed.mp4");

        client.put_file(&file, &key, "video/mp4").await.unwrap();
    }

    #[tokio::test]
    async fn test_put_file_failure_is_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string(
                "<Error><Code>SlowDown</Code><Message>Reduce your request rate</Message></Error>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).await;
        let (_dir, file) = temp_video().await;
        let key = StorageKey::from_stored("landscape/abc-processed.mp4");

        let err = client.put_file(&file, &key, "video/mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_put_missing_file() {
        let client = test_client("http://127.0.0.1:9").await;
        let key = StorageKey::from_stored("other/abc-processed.mp4");

        let err = client
            .put_file(Path::new("/nonexistent/file.mp4"), &key, "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn test_exists() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/test-bucket/portrait/present-processed.mp4"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-length", "3"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/test-bucket/portrait/absent-processed.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).await;
        assert!(client.exists("portrait/present-processed.mp4").await.unwrap());
        assert!(!client.exists("portrait/absent-processed.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_object() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/test-bucket/other/gone-processed.mp4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).await;
        client
            .delete(&StorageKey::from_stored("other/gone-processed.mp4"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_presigned_url_contains_expiry_and_signature() {
        let client = test_client("http://localhost:9000").await;

        let url = client
            .presign_get_at(
                "portrait/abc-processed.mp4",
                Duration::from_secs(3600),
                SystemTime::now(),
            )
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/test-bucket/portrait/abc-processed.mp4?"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_presigned_urls_differ_by_issuance_time() {
        let client = test_client("http://localhost:9000").await;
        let key = "landscape/abc-processed.mp4";
        let first_issued = SystemTime::now();
        let later_issued = first_issued + Duration::from_secs(90);

        let first = client
            .presign_get_at(key, Duration::from_secs(3600), first_issued)
            .await
            .unwrap();
        let second = client
            .presign_get_at(key, Duration::from_secs(3600), later_issued)
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(first.contains("X-Amz-Expires=3600"));
        assert!(second.contains("X-Amz-Expires=3600"));

        // Same inputs sign identically
        let again = client
            .presign_get_at(key, Duration::from_secs(3600), first_issued)
            .await
            .unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn test_check_connectivity() {
        let server = MockServer::start().await;
        // Path-style HeadBucket is sent as `/<bucket>/`
        Mock::given(method("HEAD"))
            .and(path_regex(r"^/test-bucket/?$"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).await;
        ObjectStore::check_connectivity(&client).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_connectivity_missing_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).await;
        let err = client.check_connectivity().await.unwrap_err();
        assert!(matches!(err, StorageError::AwsSdk(_)));
    }

    #[tokio::test]
    async fn test_partial_static_credentials_rejected() {
        let result = S3Client::new(S3Config {
            bucket_name: BUCKET.to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: None,
        })
        .await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
