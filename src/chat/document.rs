//! Document Q&A flow
//!
//! Select a PDF, upload it to receive a `document_id`, then ask questions
//! scoped by that id. Selecting another file invalidates the id.

use crate::api::{MediaKind, QaBackend, SelectedFile};
use crate::chat::{Message, MessageLog, Outcome};
use crate::error::{describe_failure, Result};
use std::path::Path;

pub const SELECT_FILE_FIRST: &str = "Please select a file first.";
pub const UPLOAD_FIRST: &str = "Please upload a document first using the attachment button.";

/// State of the document chat
#[derive(Debug, Clone)]
pub struct DocumentChat {
    file: Option<SelectedFile>,
    document_id: Option<String>,
    page_count: Option<u32>,
    messages: MessageLog,
    error: Option<String>,
    show_context: bool,
    max_bytes: u64,
}

impl DocumentChat {
    /// Empty document chat
    ///
    /// # Arguments
    ///
    /// * `max_bytes` - Largest PDF accepted for upload
    /// * `show_context` - Append retrieved passages after each answer
    pub fn new(max_bytes: u64, show_context: bool) -> Self {
        Self {
            file: None,
            document_id: None,
            page_count: None,
            messages: MessageLog::new(),
            error: None,
            show_context,
            max_bytes,
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Artifact id of the uploaded document
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Last failure, cleared by the next selection or question
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Select a PDF for upload
    ///
    /// On success the previous `document_id` is dropped. An invalid file is
    /// reported as an error and leaves the state untouched.
    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        let file = SelectedFile::inspect(path, MediaKind::Document, Some(self.max_bytes))?;
        tracing::debug!("Selected document {}", file.path.display());

        self.messages.push(Message::assistant(format!(
            "Document selected: {}",
            file.file_name
        )));
        self.file = Some(file);
        self.document_id = None;
        self.page_count = None;
        self.error = None;
        Ok(())
    }

    /// Upload the selected PDF
    pub async fn upload(&mut self, backend: &dyn QaBackend) -> Outcome {
        let Some(file) = self.file.clone() else {
            self.messages.push(Message::assistant(SELECT_FILE_FIRST));
            return Outcome::Prompted;
        };

        self.error = None;
        match backend.upload_document(&file).await {
            Ok(response) => {
                tracing::info!(
                    document_id = %response.document_id,
                    pages = response.page_count,
                    "Document uploaded"
                );
                self.document_id = Some(response.document_id);
                self.page_count = Some(response.page_count);
                self.messages.push(Message::assistant(format!(
                    "Document uploaded successfully! {} pages processed. You can now ask questions about this document.",
                    response.page_count
                )));
                Outcome::Completed
            }
            Err(e) => self.fail("upload", &e),
        }
    }

    /// Ask a question about the uploaded document
    ///
    /// Blank input is ignored. Without an uploaded document the question is
    /// recorded and answered with a reminder, and no request is sent.
    pub async fn ask(&mut self, backend: &dyn QaBackend, question: &str) -> Outcome {
        if question.trim().is_empty() {
            return Outcome::Skipped;
        }

        self.messages.push(Message::user(question));
        self.error = None;

        let Some(document_id) = self.document_id.clone() else {
            self.messages.push(Message::assistant(UPLOAD_FIRST));
            return Outcome::Prompted;
        };

        match backend.ask_document(&document_id, question).await {
            Ok(answer) => {
                self.messages.push(Message::assistant(answer.answer));
                if self.show_context {
                    for passage in answer.context.unwrap_or_default() {
                        self.messages.push(Message::context(passage));
                    }
                }
                Outcome::Completed
            }
            Err(e) => self.fail("question", &e),
        }
    }

    fn fail(&mut self, action: &str, err: &anyhow::Error) -> Outcome {
        let message = describe_failure(action, err);
        self.error = Some(message.clone());
        self.messages.push(Message::assistant(message.clone()));
        Outcome::Failed(message)
    }
}
