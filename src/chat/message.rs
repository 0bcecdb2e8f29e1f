//! Chat transcript

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry of the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    /// Supporting passage shown under an answer rather than an answer itself
    #[serde(default)]
    pub is_context: bool,
}

impl Message {
    /// Message typed by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User, false)
    }

    /// Message from the assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Assistant, false)
    }

    /// Context passage attached to the preceding answer
    pub fn context(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Assistant, true)
    }

    fn new(content: impl Into<String>, sender: Sender, is_context: bool) -> Self {
        Self {
            id: Ulid::new().to_string(),
            content: content.into(),
            sender,
            is_context,
        }
    }
}

/// Append-only, insertion-ordered list of messages
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id
    pub fn push(&mut self, message: Message) -> String {
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended after the first `count`
    ///
    /// Used by the shell to render only what an action added.
    pub fn since(&self, count: usize) -> &[Message] {
        &self.messages[count.min(self.messages.len())..]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
