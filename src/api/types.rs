//! Request and response schemas for the Q&A backend
//!
//! Response structs are the declared schema: a body is accepted only if it
//! deserializes into the matching struct. Unknown fields are tolerated,
//! missing or mistyped required fields are not.

use serde::{Deserialize, Serialize};

/// Response of `POST /api/v1/upload`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentUploadResponse {
    /// Artifact id scoping later questions
    pub document_id: String,
    /// Number of pages the backend extracted
    pub page_count: u32,
    /// Backend status message
    pub message: String,
}

/// Body of the document question request
#[derive(Debug, Clone, Serialize)]
pub struct DocumentQuestion<'a> {
    pub question: &'a str,
    pub document_id: &'a str,
}

/// Response of the document question endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentAnswer {
    pub answer: String,
    /// Retrieved passages the answer was grounded on
    #[serde(default)]
    pub context: Option<Vec<String>>,
}

/// Response of `POST /image-qa/upload`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageUploadResponse {
    /// Caption generated for the image
    pub description: String,
    /// Artifact id scoping later questions
    pub image_id: String,
}

/// Body of `POST /image-qa/ask`
#[derive(Debug, Clone, Serialize)]
pub struct ImageQuestion<'a> {
    pub image_id: &'a str,
    pub question: &'a str,
}

/// Response of `POST /image-qa/ask`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageAnswer {
    pub answer: String,
    /// Key points backing the answer
    #[serde(default)]
    pub context_snippets: Option<Vec<String>>,
}

/// Response of `POST /video-qa/upload-video`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoUploadResponse {
    pub response_text: String,
    pub message: String,
}

/// Body of `POST /video-qa/process-youtube`
#[derive(Debug, Clone, Serialize)]
pub struct YoutubeRequest<'a> {
    pub url: &'a str,
}

/// A moment in a YouTube video referenced by the summary
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoTimestamp {
    /// Timestamp as written in the summary, e.g. `"1:05"`
    pub timestamp: String,
    /// Offset from the start of the video
    pub start_seconds: u64,
    /// Embeddable player URL starting at `start_seconds`
    pub embed_url: String,
}

/// Response of `POST /video-qa/process-youtube`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct YoutubeResponse {
    pub response_text: String,
    pub message: String,
    #[serde(default)]
    pub timestamps: Vec<VideoTimestamp>,
}
