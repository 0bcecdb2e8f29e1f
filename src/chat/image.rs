//! Image Q&A flow

use crate::api::{MediaKind, QaBackend, SelectedFile};
use crate::chat::{Message, MessageLog, Outcome};
use crate::error::describe_failure;
use crate::error::Result;
use std::path::Path;

pub const SELECT_IMAGE_FIRST: &str = "Please select an image first.";
pub const UPLOAD_IMAGE_FIRST: &str = "Please upload an image first with /upload.";

/// State of the image chat
#[derive(Debug, Clone, Default)]
pub struct ImageChat {
    file: Option<SelectedFile>,
    image_id: Option<String>,
    description: Option<String>,
    answer: Option<String>,
    context_snippets: Vec<String>,
    messages: MessageLog,
    error: Option<String>,
}

impl ImageChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// Caption returned by the last upload
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn context_snippets(&self) -> &[String] {
        &self.context_snippets
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Select an image; drops the previous upload and its answers
    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        let file = SelectedFile::inspect(path, MediaKind::Image, None)?;
        tracing::debug!("Selected image {} ({})", file.path.display(), file.mime);

        self.messages.push(Message::assistant(format!(
            "Image selected: {}",
            file.file_name
        )));
        self.file = Some(file);
        self.reset_results();
        self.error = None;
        Ok(())
    }

    /// Upload the selected image and record its caption
    pub async fn upload(&mut self, backend: &dyn QaBackend) -> Outcome {
        let Some(file) = self.file.clone() else {
            self.messages.push(Message::assistant(SELECT_IMAGE_FIRST));
            return Outcome::Prompted;
        };

        self.reset_results();
        self.error = None;
        match backend.upload_image(&file).await {
            Ok(response) => {
                tracing::info!(image_id = %response.image_id, "Image uploaded");
                self.messages
                    .push(Message::assistant(response.description.clone()));
                self.image_id = Some(response.image_id);
                self.description = Some(response.description);
                Outcome::Completed
            }
            Err(e) => self.fail("image upload", &e),
        }
    }

    /// Ask a question about the uploaded image
    pub async fn ask(&mut self, backend: &dyn QaBackend, question: &str) -> Outcome {
        if question.trim().is_empty() {
            return Outcome::Skipped;
        }

        self.messages.push(Message::user(question));
        self.error = None;

        let Some(image_id) = self.image_id.clone() else {
            self.messages.push(Message::assistant(UPLOAD_IMAGE_FIRST));
            return Outcome::Prompted;
        };

        self.answer = None;
        self.context_snippets.clear();
        match backend.ask_image(&image_id, question).await {
            Ok(answer) => {
                self.messages.push(Message::assistant(answer.answer.clone()));
                self.answer = Some(answer.answer);
                self.context_snippets = answer.context_snippets.unwrap_or_default();
                for snippet in &self.context_snippets {
                    self.messages.push(Message::context(snippet.clone()));
                }
                Outcome::Completed
            }
            Err(e) => self.fail("image question", &e),
        }
    }

    fn reset_results(&mut self) {
        self.image_id = None;
        self.description = None;
        self.answer = None;
        self.context_snippets.clear();
    }

    fn fail(&mut self, action: &str, err: &anyhow::Error) -> Outcome {
        let message = describe_failure(action, err);
        self.error = Some(message.clone());
        self.messages.push(Message::assistant(message.clone()));
        Outcome::Failed(message)
    }
}
