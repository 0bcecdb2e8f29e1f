//! StudyQA - terminal client for a document, image and video Q&A assistant
//!
//! This library provides the client side of the study assistant: signing in
//! against the hosted identity provider, uploading files to the Q&A backend,
//! and driving the per-mode chat flows.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Identity provider client, session storage and the auth context
//! - `api`: Schema-validated client for the upload and Q&A endpoints
//! - `chat`: Message log and the document/image/video state machines
//! - `routes`: Route table, legacy redirects and the session guard
//! - `preferences`: Persisted dark-mode flag
//! - `config`: Configuration management and validation
//! - `error`: Error types, result alias and user-facing failure messages
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use studyqa::commands::Services;
//! use studyqa::chat::{ChatMode, ChatWorkspace};
//! use studyqa::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let services = Services::start(config).await?;
//!     let mut workspace = ChatWorkspace::new(ChatMode::Document, &services.config);
//!     workspace.select_file(std::path::Path::new("lecture.pdf"))?;
//!     workspace.upload(services.backend.as_ref()).await;
//!     workspace.submit(services.backend.as_ref(), "What is the summary?").await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod preferences;
pub mod routes;

// Re-export commonly used types
pub use api::{HttpBackend, QaBackend};
pub use auth::{AuthContext, AuthState};
pub use chat::{ChatMode, ChatWorkspace};
pub use config::Config;
pub use error::{Result, StudyQaError};

#[cfg(test)]
pub mod test_utils;
