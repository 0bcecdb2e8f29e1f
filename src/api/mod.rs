//! Client for the study assistant's upload and Q&A API
//!
//! The backend owns document parsing, retrieval, captioning and video
//! summarisation. This module only speaks its HTTP contract:
//!
//! - multipart uploads returning an artifact id (or a summary for videos)
//! - JSON questions scoped by that artifact id
//!
//! Every response is checked against the schema in [`types`] before it is
//! handed to the chat state machines. Requests carry the bearer token of the
//! active session, read from the auth subscription at request time.

pub mod media;
pub mod types;
pub mod youtube;

use crate::auth::AuthState;
use crate::config::ApiConfig;
use crate::error::{Result, StudyQaError};
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::watch;

pub use media::{MediaKind, SelectedFile};
pub use types::{
    DocumentAnswer, DocumentUploadResponse, ImageAnswer, ImageUploadResponse, VideoTimestamp,
    VideoUploadResponse, YoutubeResponse,
};

pub const DOCUMENT_UPLOAD_PATH: &str = "/api/v1/upload";
pub const IMAGE_UPLOAD_PATH: &str = "/image-qa/upload";
pub const IMAGE_ASK_PATH: &str = "/image-qa/ask";
pub const VIDEO_UPLOAD_PATH: &str = "/video-qa/upload-video";
pub const YOUTUBE_PATH: &str = "/video-qa/process-youtube";

/// Operations the chat modes need from the Q&A backend
///
/// Implementations must return [`StudyQaError::InvalidResponse`] for bodies
/// that do not match the schema and [`StudyQaError::Api`] for non-success
/// statuses, so the chat layer can phrase the failure for the user.
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Upload a PDF for document Q&A
    async fn upload_document(&self, file: &SelectedFile) -> Result<DocumentUploadResponse>;

    /// Ask a question about an uploaded document
    async fn ask_document(&self, document_id: &str, question: &str) -> Result<DocumentAnswer>;

    /// Upload an image and receive its caption
    async fn upload_image(&self, file: &SelectedFile) -> Result<ImageUploadResponse>;

    /// Ask a question about an uploaded image
    async fn ask_image(&self, image_id: &str, question: &str) -> Result<ImageAnswer>;

    /// Upload a video file and receive its summary
    async fn upload_video(&self, file: &SelectedFile) -> Result<VideoUploadResponse>;

    /// Summarise a YouTube video by URL
    async fn process_youtube(&self, url: &str) -> Result<YoutubeResponse>;
}

/// [`QaBackend`] over HTTP
///
/// # Examples
///
/// ```
/// use studyqa::api::HttpBackend;
/// use studyqa::auth::AuthState;
/// use studyqa::config::ApiConfig;
///
/// let (_tx, rx) = tokio::sync::watch::channel(AuthState::default());
/// let backend = HttpBackend::new(ApiConfig::default(), rx);
/// assert!(backend.is_ok());
/// ```
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
    auth: watch::Receiver<AuthState>,
}

impl HttpBackend {
    /// Create a backend client
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, endpoint paths and timeout
    /// * `auth` - Subscription to the auth context; its current session
    ///   supplies the bearer token
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ApiConfig, auth: watch::Receiver<AuthState>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("studyqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StudyQaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Q&A backend client: base_url={}", config.base_url);

        Ok(Self {
            client,
            config,
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .auth
            .borrow()
            .session
            .as_ref()
            .map(|session| session.access_token.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => {
                tracing::debug!("No active session; sending request without Authorization");
                request
            }
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", path);
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", path, e);
            StudyQaError::Transport(e.to_string())
        })?;
        parse_response(path, response).await
    }

    async fn post_file<T>(&self, path: &str, file: &SelectedFile) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = file.read().await?;
        tracing::info!(
            "Uploading {} ({} bytes, {}) to {}",
            file.file_name,
            bytes.len(),
            file.mime,
            path
        );

        let part = multipart::Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| StudyQaError::InvalidFile(format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let request = self.authorize(self.client.post(self.url(path)).multipart(form));
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Upload to {} failed: {}", path, e);
            StudyQaError::Transport(e.to_string())
        })?;
        parse_response(path, response).await
    }
}

/// Validate a backend response against schema `T`
///
/// Non-success statuses become [`StudyQaError::Api`] carrying the server's
/// `detail`; bodies that do not deserialize into `T` become
/// [`StudyQaError::InvalidResponse`].
pub async fn parse_response<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| StudyQaError::Transport(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        tracing::error!("{} returned error {}: {}", endpoint, status, body);
        return Err(StudyQaError::Api {
            status: status.as_u16(),
            detail: error_detail(&body),
        }
        .into());
    }

    serde_json::from_str(&body).map_err(|e| {
        StudyQaError::InvalidResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Extract the `detail` of a FastAPI error body
///
/// `detail` is a string for raised HTTP errors and a list of objects for
/// request validation failures; lists are flattened to their `msg` fields.
///
/// # Examples
///
/// ```
/// use studyqa::api::error_detail;
///
/// assert_eq!(
///     error_detail(r#"{"detail":"Document not found"}"#),
///     Some("Document not found".to_string())
/// );
/// assert_eq!(error_detail("Internal Server Error"), None);
/// ```
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg").and_then(|m| m.as_str()) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl QaBackend for HttpBackend {
    async fn upload_document(&self, file: &SelectedFile) -> Result<DocumentUploadResponse> {
        self.post_file(DOCUMENT_UPLOAD_PATH, file).await
    }

    async fn ask_document(&self, document_id: &str, question: &str) -> Result<DocumentAnswer> {
        let body = types::DocumentQuestion {
            question,
            document_id,
        };
        self.post_json(&self.config.document_ask_path, &body).await
    }

    async fn upload_image(&self, file: &SelectedFile) -> Result<ImageUploadResponse> {
        self.post_file(IMAGE_UPLOAD_PATH, file).await
    }

    async fn ask_image(&self, image_id: &str, question: &str) -> Result<ImageAnswer> {
        let body = types::ImageQuestion { image_id, question };
        self.post_json(IMAGE_ASK_PATH, &body).await
    }

    async fn upload_video(&self, file: &SelectedFile) -> Result<VideoUploadResponse> {
        self.post_file(VIDEO_UPLOAD_PATH, file).await
    }

    async fn process_youtube(&self, url: &str) -> Result<YoutubeResponse> {
        let body = types::YoutubeRequest { url };
        self.post_json(YOUTUBE_PATH, &body).await
    }
}
