//! Test utilities for StudyQA
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, sample sessions, and in-memory fakes of
//! the identity provider and the Q&A backend.

use crate::api::{
    DocumentAnswer, DocumentUploadResponse, ImageAnswer, ImageUploadResponse, QaBackend,
    SelectedFile, VideoUploadResponse, YoutubeResponse,
};
use crate::auth::{IdentityProvider, Session, SignUpOutcome, User};
use crate::error::{Result, StudyQaError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// User with the given email
pub fn sample_user(email: &str) -> User {
    User {
        id: format!("user-{}", email),
        email: Some(email.to_string()),
        created_at: None,
        last_sign_in_at: None,
        user_metadata: serde_json::Value::Null,
    }
}

/// Whole-second timestamp `offset_secs` from now
///
/// Stored sessions keep `expires_at` at second precision, so fixtures do too.
pub fn seconds_from_now(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp() + offset_secs, 0).unwrap_or_else(Utc::now)
}

/// Session valid for another hour
pub fn sample_session(access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        token_type: "bearer".to_string(),
        expires_at: Some(seconds_from_now(3600)),
        refresh_token: Some(format!("{}-refresh", access_token)),
        user: sample_user("student@example.com"),
    }
}

/// Session that expired a minute ago
pub fn expired_session(access_token: &str, refresh_token: Option<&str>) -> Session {
    Session {
        expires_at: Some(seconds_from_now(-60)),
        refresh_token: refresh_token.map(str::to_string),
        ..sample_session(access_token)
    }
}

/// In-memory identity provider
///
/// Password "wrong" is rejected; any other password signs in. Refreshes
/// return a session with access token "refreshed".
#[derive(Default)]
pub struct FakeIdentityProvider {
    pub fail_refresh: bool,
    pub fail_sign_out: bool,
    /// Sign-ups return `ConfirmationRequired` instead of a session
    pub confirm_sign_ups: bool,
    pub refreshed: Mutex<Vec<String>>,
    pub sign_outs: Mutex<usize>,
}

impl FakeIdentityProvider {
    /// Refresh tokens passed to `refresh_session`, in call order
    pub fn refreshed_with(&self) -> Vec<String> {
        self.refreshed.lock().unwrap().clone()
    }

    pub fn sign_out_calls(&self) -> usize {
        *self.sign_outs.lock().unwrap()
    }

    fn session_for(email: &str, access_token: &str) -> Session {
        Session {
            user: sample_user(email),
            ..sample_session(access_token)
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        if password == "wrong" {
            return Err(StudyQaError::Authentication("Invalid login credentials".to_string()).into());
        }
        Ok(Self::session_for(email, "signed-in"))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome> {
        if self.confirm_sign_ups {
            Ok(SignUpOutcome::ConfirmationRequired(sample_user(email)))
        } else {
            Ok(SignUpOutcome::SignedIn(Self::session_for(email, "signed-up")))
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        self.refreshed.lock().unwrap().push(refresh_token.to_string());
        if self.fail_refresh {
            return Err(StudyQaError::Authentication("Invalid Refresh Token".to_string()).into());
        }
        Ok(sample_session("refreshed"))
    }

    async fn get_user(&self, access_token: &str) -> Result<User> {
        Ok(User {
            id: format!("user-{}", access_token),
            ..sample_user("oauth@example.com")
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<()> {
        *self.sign_outs.lock().unwrap() += 1;
        if self.fail_sign_out {
            return Err(StudyQaError::Transport("connection refused".to_string()).into());
        }
        Ok(())
    }

    fn authorize_url(&self, provider: &str) -> Result<url::Url> {
        let mut url = url::Url::parse("https://identity.test/auth/v1/authorize")
            .map_err(|e| StudyQaError::Config(e.to_string()))?;
        url.query_pairs_mut().append_pair("provider", provider);
        Ok(url)
    }
}

/// Scripted reply of [`FakeBackend`]
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Body to validate against the operation's response schema
    Json(serde_json::Value),
    /// Non-success status with an optional `detail`
    Api(u16, Option<String>),
    /// The request never got a response
    Transport,
}

/// In-memory Q&A backend with per-operation reply queues
///
/// JSON replies go through the same schema validation as real responses, so
/// malformed bodies surface as [`StudyQaError::InvalidResponse`]. An
/// operation without a queued reply fails with a transport error.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<HashMap<&'static str, VecDeque<FakeReply>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `operation`
    pub fn reply(self, operation: &'static str, reply: FakeReply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(reply);
        self
    }

    /// Operations called so far with a summary of their arguments
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn respond<T: DeserializeOwned>(&self, operation: &'static str, argument: String) -> Result<T> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), argument));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or(FakeReply::Transport);

        match reply {
            FakeReply::Json(body) => serde_json::from_value(body).map_err(|e| {
                StudyQaError::InvalidResponse {
                    endpoint: operation.to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
            FakeReply::Api(status, detail) => Err(StudyQaError::Api { status, detail }.into()),
            FakeReply::Transport => {
                Err(StudyQaError::Transport("connection refused".to_string()).into())
            }
        }
    }
}

#[async_trait]
impl QaBackend for FakeBackend {
    async fn upload_document(&self, file: &SelectedFile) -> Result<DocumentUploadResponse> {
        self.respond("upload_document", file.file_name.clone())
    }

    async fn ask_document(&self, document_id: &str, question: &str) -> Result<DocumentAnswer> {
        self.respond("ask_document", format!("{}|{}", document_id, question))
    }

    async fn upload_image(&self, file: &SelectedFile) -> Result<ImageUploadResponse> {
        self.respond("upload_image", file.file_name.clone())
    }

    async fn ask_image(&self, image_id: &str, question: &str) -> Result<ImageAnswer> {
        self.respond("ask_image", format!("{}|{}", image_id, question))
    }

    async fn upload_video(&self, file: &SelectedFile) -> Result<VideoUploadResponse> {
        self.respond("upload_video", file.file_name.clone())
    }

    async fn process_youtube(&self, url: &str) -> Result<YoutubeResponse> {
        self.respond("process_youtube", url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(StudyQaError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_sample_sessions_expiry() {
        assert!(!sample_session("a").is_expired());
        assert!(expired_session("a", None).is_expired());
    }

    #[test]
    fn test_sample_session_expiry_has_whole_seconds() {
        for session in [sample_session("a"), expired_session("a", Some("r"))] {
            let expires_at = session.expires_at.unwrap();
            assert_eq!(expires_at.timestamp_subsec_nanos(), 0);
            let json = serde_json::to_string(&session).unwrap();
            let back: Session = serde_json::from_str(&json).unwrap();
            assert_eq!(back, session);
        }
    }

    #[tokio::test]
    async fn test_fake_identity_provider_with_overrides() {
        let provider = FakeIdentityProvider {
            fail_refresh: true,
            ..FakeIdentityProvider::default()
        };
        assert!(provider.refresh_session("r1").await.is_err());
        assert_eq!(provider.refreshed_with(), vec!["r1".to_string()]);
        assert_eq!(provider.sign_out_calls(), 0);
    }

    #[tokio::test]
    async fn test_fake_backend_unscripted_is_transport_error() {
        let backend = FakeBackend::new();
        let err = backend.process_youtube("u").await.unwrap_err();
        assert_eq!(
            crate::error::describe_failure("YouTube video", &err),
            "Error processing YouTube video"
        );
        assert_eq!(backend.calls().len(), 1);
    }
}
