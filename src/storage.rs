use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::sync::{Arc, Mutex};

use crate::media;
use crate::retry::{RetryError, RetryPolicy, with_retry};

/// UploadedMedia
///
/// What the media store reports back for a stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    /// Public URL under which the file is served.
    pub url: String,
    /// Duration in seconds for video containers, 0 otherwise.
    pub duration: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("upload timed out")]
    Timeout,
}

impl From<RetryError<String>> for StorageError {
    fn from(err: RetryError<String>) -> Self {
        match err {
            RetryError::TimedOut { .. } => StorageError::Timeout,
            RetryError::Failed { last_error, .. } => StorageError::Upload(last_error),
        }
    }
}

// 1. StorageService Contract
/// StorageService
///
/// Abstract contract for the object store holding video files and thumbnails. The real
/// S3 client (S3StorageClient) and the in-memory mock (MockStorageService) are
/// interchangeable behind `StorageState`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup to
    /// provision the MinIO bucket.
    async fn ensure_bucket_exists(&self);

    /// Stores `bytes` under `key` and returns the public URL plus the media duration.
    ///
    /// # Arguments
    /// * `key`: The object key (path + filename) in the bucket.
    /// * `content_type`: MIME type recorded on the object (e.g., "video/mp4").
    async fn upload_media(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, StorageError>;
}

// 2. The Real Implementation (S3/MinIO)
/// S3StorageClient
///
/// AWS SDK based implementation, talking to MinIO locally and to any S3-compatible
/// service in production. Path-style addressing is forced for MinIO compatibility.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
    retry: RetryPolicy,
}

impl S3StorageClient {
    /// new
    ///
    /// Builds the S3 client from the storage settings of `AppConfig`.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base_url: &str,
        retry: RetryPolicy,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            bucket_name: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// Public URL of an object stored under `key`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, sanitize_key(key))
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// ensure_bucket_exists
    ///
    /// CreateBucket is idempotent for the owner, so calling it at startup is safe.
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!("create_bucket: {:?}", e);
        }
    }

    async fn upload_media(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, StorageError> {
        let key = sanitize_key(key);
        let duration = media::read_duration(&bytes).unwrap_or(0.0);
        let size = bytes.len();

        with_retry(&self.retry, "s3 put_object", || {
            // ByteStream consumes its buffer, so every attempt gets a fresh copy.
            let body = ByteStream::from(bytes.clone());
            let request = self
                .client
                .put_object()
                .bucket(&self.bucket_name)
                .key(&key)
                .content_type(content_type)
                .body(body);
            async move { request.send().await.map_err(|e| e.to_string()) }
        })
        .await?;

        tracing::info!(key = %key, size, "media uploaded");

        Ok(UploadedMedia {
            url: self.public_url(&key),
            duration,
        })
    }
}

/// sanitize_key
///
/// Removes directory navigation segments (`..`, `.`) and empty segments from an
/// object key.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// Keeps uploads in memory so handler tests can assert on what was (or was not)
/// uploaded, without a network connection.
#[derive(Default)]
pub struct MockStorageService {
    /// When true, every upload fails.
    pub should_fail: bool,
    uploads: Mutex<Vec<String>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Keys of all successful uploads, in upload order.
    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload_media(
        &self,
        key: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, StorageError> {
        if self.should_fail {
            return Err(StorageError::Upload(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        let key = sanitize_key(key);
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(key.clone());
        }

        Ok(UploadedMedia {
            url: format!("http://localhost:9000/mock-bucket/{}", key),
            duration: media::read_duration(&bytes).unwrap_or(0.0),
        })
    }
}

/// StorageState
///
/// The shared handle to the media store held by `AppState`.
pub type StorageState = Arc<dyn StorageService>;
