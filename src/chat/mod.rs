//! Per-mode chat state machines
//!
//! Each mode follows the same shape: select a file, upload it, then ask.
//! Every action appends to the mode's [`MessageLog`] and reports an
//! [`Outcome`] the shell uses to decide what to render.

pub mod document;
pub mod image;
pub mod message;
pub mod mode;
pub mod video;
pub mod workspace;

pub use document::DocumentChat;
pub use image::ImageChat;
pub use message::{Message, MessageLog, Sender};
pub use mode::ChatMode;
pub use video::VideoChat;
pub use workspace::{ChatWorkspace, ModeState};

/// Result of a chat action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Input was blank; nothing was recorded or sent
    Skipped,
    /// A precondition was missing; a hint was appended instead of a request
    Prompted,
    /// The request succeeded and its result was appended
    Completed,
    /// The request failed; carries the message appended to the transcript
    Failed(String),
}
