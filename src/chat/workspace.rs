//! Mode switching
//!
//! The workspace owns exactly one mode's state at a time. Switching to a
//! different mode drops that state and starts the new mode empty, so no
//! selection, artifact id or transcript leaks across modes.

use crate::api::QaBackend;
use crate::chat::{ChatMode, DocumentChat, ImageChat, MessageLog, Outcome, VideoChat};
use crate::config::Config;
use crate::error::Result;
use std::path::Path;

/// State of the active mode
#[derive(Debug, Clone)]
pub enum ModeState {
    Document(DocumentChat),
    Image(ImageChat),
    Video(VideoChat),
}

/// Chat sessions behind the interactive shell
#[derive(Debug, Clone)]
pub struct ChatWorkspace {
    state: ModeState,
    max_document_bytes: u64,
    show_context: bool,
}

impl ChatWorkspace {
    /// Create a workspace starting in `mode`
    pub fn new(mode: ChatMode, config: &Config) -> Self {
        let max_document_bytes = config.uploads.max_document_bytes;
        let show_context = config.chat.show_context;
        Self {
            state: Self::fresh(mode, max_document_bytes, show_context),
            max_document_bytes,
            show_context,
        }
    }

    fn fresh(mode: ChatMode, max_document_bytes: u64, show_context: bool) -> ModeState {
        match mode {
            ChatMode::Document => {
                ModeState::Document(DocumentChat::new(max_document_bytes, show_context))
            }
            ChatMode::Image => ModeState::Image(ImageChat::new()),
            ChatMode::Video => ModeState::Video(VideoChat::new()),
        }
    }

    pub fn mode(&self) -> ChatMode {
        match self.state {
            ModeState::Document(_) => ChatMode::Document,
            ModeState::Image(_) => ChatMode::Image,
            ModeState::Video(_) => ChatMode::Video,
        }
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    /// Switch to `mode`
    ///
    /// Returns `false` when `mode` is already active; its state is kept.
    pub fn switch_mode(&mut self, mode: ChatMode) -> bool {
        if mode == self.mode() {
            return false;
        }
        tracing::debug!("Switching chat mode {} -> {}", self.mode(), mode);
        self.state = Self::fresh(mode, self.max_document_bytes, self.show_context);
        true
    }

    /// Discard the active mode's state, staying in the same mode
    pub fn reset(&mut self) {
        tracing::debug!("Resetting {} chat", self.mode());
        self.state = Self::fresh(self.mode(), self.max_document_bytes, self.show_context);
    }

    /// Transcript of the active mode
    pub fn messages(&self) -> &MessageLog {
        match &self.state {
            ModeState::Document(chat) => chat.messages(),
            ModeState::Image(chat) => chat.messages(),
            ModeState::Video(chat) => chat.messages(),
        }
    }

    /// Whether the active mode has an artifact to ask about
    pub fn loaded(&self) -> bool {
        match &self.state {
            ModeState::Document(chat) => chat.document_id().is_some(),
            ModeState::Image(chat) => chat.image_id().is_some(),
            ModeState::Video(chat) => chat.response_text().is_some(),
        }
    }

    /// Last failure of the active mode
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ModeState::Document(chat) => chat.error(),
            ModeState::Image(chat) => chat.error(),
            ModeState::Video(chat) => chat.error(),
        }
    }

    /// Select a file for the active mode
    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        match &mut self.state {
            ModeState::Document(chat) => chat.select_file(path),
            ModeState::Image(chat) => chat.select_file(path),
            ModeState::Video(chat) => chat.select_file(path),
        }
    }

    /// Upload the selected file of the active mode
    pub async fn upload(&mut self, backend: &dyn QaBackend) -> Outcome {
        match &mut self.state {
            ModeState::Document(chat) => chat.upload(backend).await,
            ModeState::Image(chat) => chat.upload(backend).await,
            ModeState::Video(chat) => chat.upload(backend).await,
        }
    }

    /// Handle a line of free text
    ///
    /// Document and image modes treat it as a question; video mode treats it
    /// as a YouTube URL.
    pub async fn submit(&mut self, backend: &dyn QaBackend, input: &str) -> Outcome {
        match &mut self.state {
            ModeState::Document(chat) => chat.ask(backend, input).await,
            ModeState::Image(chat) => chat.ask(backend, input).await,
            ModeState::Video(chat) => chat.process_youtube(backend, input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir, FakeBackend, FakeReply};
    use serde_json::json;

    fn workspace(mode: ChatMode) -> ChatWorkspace {
        ChatWorkspace::new(mode, &Config::default())
    }

    #[tokio::test]
    async fn test_switching_mode_resets_state() {
        let dir = temp_dir();
        let pdf = create_test_file(&dir, "a.pdf", "%PDF");
        let backend = FakeBackend::new().reply(
            "upload_document",
            FakeReply::Json(json!({"document_id": "doc_1", "page_count": 1, "message": "ok"})),
        );
        let mut ws = workspace(ChatMode::Document);
        ws.select_file(&pdf).unwrap();
        ws.upload(&backend).await;
        assert!(ws.loaded());

        assert!(ws.switch_mode(ChatMode::Image));
        assert_eq!(ws.mode(), ChatMode::Image);
        assert!(ws.messages().is_empty());
        assert!(!ws.loaded());

        assert!(ws.switch_mode(ChatMode::Document));
        assert!(ws.messages().is_empty());
        match ws.state() {
            ModeState::Document(chat) => {
                assert_eq!(chat.document_id(), None);
                assert!(chat.file().is_none());
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_switching_to_same_mode_keeps_state() {
        let dir = temp_dir();
        let pdf = create_test_file(&dir, "a.pdf", "%PDF");
        let mut ws = workspace(ChatMode::Document);
        ws.select_file(&pdf).unwrap();

        assert!(!ws.switch_mode(ChatMode::Document));
        assert_eq!(ws.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_keeps_mode_and_drops_state() {
        let dir = temp_dir();
        let pdf = create_test_file(&dir, "a.pdf", "%PDF");
        let backend = FakeBackend::new().reply(
            "upload_document",
            FakeReply::Json(json!({"document_id": "doc_1", "page_count": 1, "message": "ok"})),
        );
        let mut ws = workspace(ChatMode::Document);
        ws.select_file(&pdf).unwrap();
        ws.upload(&backend).await;
        assert!(ws.loaded());

        ws.reset();

        assert_eq!(ws.mode(), ChatMode::Document);
        assert!(ws.messages().is_empty());
        assert!(!ws.loaded());
        match ws.state() {
            ModeState::Document(chat) => assert!(chat.file().is_none()),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_routes_by_mode() {
        let backend = FakeBackend::new().reply(
            "process_youtube",
            FakeReply::Json(json!({"response_text": "s", "message": "m"})),
        );
        let mut ws = workspace(ChatMode::Video);
        assert_eq!(
            ws.submit(&backend, "https://youtu.be/abc").await,
            Outcome::Completed
        );
        assert_eq!(backend.calls()[0].0, "process_youtube");

        ws.switch_mode(ChatMode::Image);
        assert_eq!(ws.submit(&backend, "hello").await, Outcome::Prompted);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_selection_uses_active_mode_kind() {
        let dir = temp_dir();
        let png = create_test_file(&dir, "a.png", "png");
        let mut ws = workspace(ChatMode::Document);
        assert!(ws.select_file(&png).is_err());
        ws.switch_mode(ChatMode::Image);
        assert!(ws.select_file(&png).is_ok());
    }

    #[test]
    fn test_document_limit_comes_from_config() {
        let dir = temp_dir();
        let pdf = create_test_file(&dir, "big.pdf", "0123456789");
        let mut config = Config::default();
        config.uploads.max_document_bytes = 4;
        let mut ws = ChatWorkspace::new(ChatMode::Document, &config);
        assert!(ws.select_file(&pdf).is_err());
    }
}
