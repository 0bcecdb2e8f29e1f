//! Video summarisation flow
//!
//! Two independent inputs share one result area: an uploaded video file or a
//! YouTube URL. Either produces a summary text and a status message; YouTube
//! summaries also carry clickable timestamps.

use crate::api::youtube;
use crate::api::{MediaKind, QaBackend, SelectedFile, VideoTimestamp};
use crate::chat::{Message, MessageLog, Outcome};
use crate::error::{describe_failure, Result};
use std::path::Path;

pub const SELECT_VIDEO_FIRST: &str = "Please select a video first.";

/// State of the video chat
#[derive(Debug, Clone, Default)]
pub struct VideoChat {
    file: Option<SelectedFile>,
    /// Id of the last submitted YouTube video, for the embed preview
    video_id: Option<String>,
    response_text: Option<String>,
    status: Option<String>,
    timestamps: Vec<VideoTimestamp>,
    messages: MessageLog,
    error: Option<String>,
}

impl VideoChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Summary of the last processed video
    pub fn response_text(&self) -> Option<&str> {
        self.response_text.as_deref()
    }

    /// Backend status message of the last processed video
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn timestamps(&self) -> &[VideoTimestamp] {
        &self.timestamps
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Select a video file; clears the previous result
    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        let file = SelectedFile::inspect(path, MediaKind::Video, None)?;
        tracing::debug!("Selected video {}", file.path.display());

        self.messages.push(Message::assistant(format!(
            "Video selected: {}",
            file.file_name
        )));
        self.file = Some(file);
        self.clear_result();
        self.error = None;
        Ok(())
    }

    /// Upload the selected video for summarisation
    pub async fn upload(&mut self, backend: &dyn QaBackend) -> Outcome {
        let Some(file) = self.file.clone() else {
            self.messages.push(Message::assistant(SELECT_VIDEO_FIRST));
            return Outcome::Prompted;
        };

        self.clear_result();
        self.error = None;
        match backend.upload_video(&file).await {
            Ok(response) => {
                tracing::info!("Video {} summarised", file.file_name);
                self.record(response.response_text, response.message, Vec::new());
                Outcome::Completed
            }
            Err(e) => self.fail("video upload", &e),
        }
    }

    /// Summarise a YouTube video
    ///
    /// Blank input is ignored. The URL is trimmed before it is sent.
    pub async fn process_youtube(&mut self, backend: &dyn QaBackend, url: &str) -> Outcome {
        let url = url.trim();
        if url.is_empty() {
            return Outcome::Skipped;
        }

        self.messages.push(Message::user(url));
        self.clear_result();
        self.error = None;
        self.video_id = youtube::extract_video_id(url);

        match backend.process_youtube(url).await {
            Ok(response) => {
                tracing::info!(
                    timestamps = response.timestamps.len(),
                    "YouTube video summarised"
                );
                self.record(response.response_text, response.message, response.timestamps);
                Outcome::Completed
            }
            Err(e) => self.fail("YouTube video", &e),
        }
    }

    fn record(&mut self, response_text: String, status: String, timestamps: Vec<VideoTimestamp>) {
        self.messages.push(Message::assistant(response_text.clone()));
        self.response_text = Some(response_text);
        self.status = Some(status);
        self.timestamps = timestamps;
    }

    fn clear_result(&mut self) {
        self.video_id = None;
        self.response_text = None;
        self.status = None;
        self.timestamps.clear();
    }

    fn fail(&mut self, action: &str, err: &anyhow::Error) -> Outcome {
        let message = describe_failure(action, err);
        self.error = Some(message.clone());
        self.status = Some(message.clone());
        self.messages.push(Message::assistant(message.clone()));
        Outcome::Failed(message)
    }
}
