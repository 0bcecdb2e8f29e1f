//! Configuration management for StudyQA
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::chat::ChatMode;
use crate::error::{Result, StudyQaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for StudyQA
///
/// This structure holds everything the client needs to reach the Q&A
/// backend and the identity provider, plus chat and storage preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Q&A backend settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Identity provider (Supabase GoTrue) settings
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Client-side upload limits
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Location of the preferences file (dark-mode flag)
    ///
    /// When unset the file lives in the user's data directory.
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

/// Q&A backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000`
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Path of the document question endpoint
    ///
    /// Deployments have used both `/api/v1/ask` and `/api/v1/query`.
    #[serde(default = "default_document_ask_path")]
    pub document_ask_path: String,

    /// Timeout for a single request (seconds)
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_document_ask_path() -> String {
    "/api/v1/ask".to_string()
}

fn default_api_timeout() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            document_ask_path: default_document_ask_path(),
            timeout_seconds: default_api_timeout(),
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    #[serde(default)]
    pub url: String,

    /// Public anon key sent as the `apikey` header
    #[serde(default)]
    pub anon_key: String,

    /// Where the OAuth provider redirects after Google sign-in
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
}

fn default_redirect_url() -> String {
    "http://localhost:3000/".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            redirect_url: default_redirect_url(),
        }
    }
}

/// Upload limits enforced before any bytes leave the machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest PDF accepted for document Q&A (bytes)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

fn default_max_document_bytes() -> u64 {
    50 * 1024 * 1024 // 50 MB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

/// Chat mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Mode the shell starts in: "document", "image" or "video"
    #[serde(default = "default_chat_mode")]
    pub default_mode: String,

    /// Append the retrieved context passages after each document answer
    #[serde(default)]
    pub show_context: bool,
}

fn default_chat_mode() -> String {
    "document".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_mode: default_chat_mode(),
            show_context: false,
        }
    }
}

/// Where the signed-in session is persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStorage {
    /// OS native credential store
    #[default]
    Keyring,
    /// Plain JSON file
    File,
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage backend
    #[serde(default)]
    pub storage: SessionStorage,

    /// File used when `storage` is `file`; defaults to the data directory
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StudyQaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| StudyQaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("STUDYQA_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(ask_path) = std::env::var("STUDYQA_DOCUMENT_ASK_PATH") {
            self.api.document_ask_path = ask_path;
        }

        if let Ok(timeout) = std::env::var("STUDYQA_API_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid STUDYQA_API_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(url) = std::env::var("STUDYQA_IDENTITY_URL") {
            self.identity.url = url;
        }

        if let Ok(key) = std::env::var("STUDYQA_IDENTITY_ANON_KEY") {
            self.identity.anon_key = key;
        }

        if let Ok(redirect) = std::env::var("STUDYQA_IDENTITY_REDIRECT_URL") {
            self.identity.redirect_url = redirect;
        }

        if let Ok(mode) = std::env::var("STUDYQA_CHAT_MODE") {
            self.chat.default_mode = mode;
        }

        if let Ok(storage) = std::env::var("STUDYQA_SESSION_STORAGE") {
            self.session.storage = match storage.to_lowercase().as_str() {
                "keyring" => SessionStorage::Keyring,
                "file" => SessionStorage::File,
                _ => {
                    tracing::warn!("Invalid session storage: {}, using default", storage);
                    SessionStorage::default()
                }
            };
        }

        if let Ok(path) = std::env::var("STUDYQA_SESSION_FILE") {
            self.session.file_path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!(api_url = %api_url, "CLI override: api.base_url");
            self.api.base_url = api_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(StudyQaError::Config(format!(
                "api.base_url is not a valid URL: {}",
                self.api.base_url
            ))
            .into());
        }

        if !self.api.document_ask_path.starts_with('/') {
            return Err(StudyQaError::Config(
                "api.document_ask_path must start with '/'".to_string(),
            )
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(StudyQaError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !self.identity.url.is_empty() && url::Url::parse(&self.identity.url).is_err() {
            return Err(StudyQaError::Config(format!(
                "identity.url is not a valid URL: {}",
                self.identity.url
            ))
            .into());
        }

        if url::Url::parse(&self.identity.redirect_url).is_err() {
            return Err(StudyQaError::Config(format!(
                "identity.redirect_url is not a valid URL: {}",
                self.identity.redirect_url
            ))
            .into());
        }

        if self.uploads.max_document_bytes == 0 {
            return Err(StudyQaError::Config(
                "uploads.max_document_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        ChatMode::parse_str(&self.chat.default_mode).map_err(StudyQaError::Config)?;

        Ok(())
    }

    /// Whether an identity provider has been configured
    pub fn has_identity_provider(&self) -> bool {
        !self.identity.url.is_empty() && !self.identity.anon_key.is_empty()
    }
}
