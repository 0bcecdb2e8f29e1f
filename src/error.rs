//! Error types for StudyQA
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling, and the helper that turns
//! a failed action into the message shown in the chat transcript.

use thiserror::Error;

/// Main error type for StudyQA operations
///
/// This enum encompasses all possible errors that can occur while loading
/// configuration, talking to the identity provider, calling the Q&A backend,
/// and handling local files.
#[derive(Error, Debug)]
pub enum StudyQaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend response did not match its declared schema
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse {
        /// Endpoint path that produced the response
        endpoint: String,
        /// Deserializer message describing the mismatch
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code
        status: u16,
        /// Server-provided `detail`, when the body carried one
        detail: Option<String>,
    },

    /// The request never produced a response (connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Identity provider rejected the request
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// An operation needs a session but none is active
    #[error("Not signed in")]
    NotSignedIn,

    /// A local file cannot be uploaded in the current mode
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for StudyQA operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Message shown when a response fails schema validation.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format from server";

/// Turn a failed action into the text shown to the user
///
/// Schema mismatches collapse to [`INVALID_RESPONSE_MESSAGE`], API errors
/// surface the server's `detail` when present, and everything else falls
/// back to `Error processing {action}`.
///
/// # Examples
///
/// ```
/// use studyqa::error::{describe_failure, StudyQaError};
///
/// let err = anyhow::Error::new(StudyQaError::Api {
///     status: 400,
///     detail: Some("Only PDF files are allowed".to_string()),
/// });
/// assert_eq!(describe_failure("upload", &err), "Only PDF files are allowed");
///
/// let err = anyhow::Error::new(StudyQaError::Transport("refused".to_string()));
/// assert_eq!(describe_failure("question", &err), "Error processing question");
/// ```
pub fn describe_failure(action: &str, err: &anyhow::Error) -> String {
    match err.downcast_ref::<StudyQaError>() {
        Some(StudyQaError::InvalidResponse { endpoint, message }) => {
            tracing::error!(%endpoint, %message, "{} response failed validation", action);
            INVALID_RESPONSE_MESSAGE.to_string()
        }
        Some(StudyQaError::Api {
            detail: Some(detail),
            ..
        }) if !detail.trim().is_empty() => {
            tracing::error!("{} error: {}", action, err);
            detail.clone()
        }
        Some(StudyQaError::InvalidFile(reason)) => reason.clone(),
        _ => {
            tracing::error!("{} error: {:#}", action, err);
            format!("Error processing {}", action)
        }
    }
}
