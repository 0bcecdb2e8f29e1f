//! Chat mode types
//!
//! A mode selects which upload-and-ask flow is active and the copy shown in
//! the shell header:
//! - Document mode: PDF upload, questions answered from the document
//! - Image mode: image upload, caption plus questions about the image
//! - Video mode: video upload or YouTube URL, summary with timestamps

use crate::api::MediaKind;
use colored::Colorize;
use std::fmt;

/// Chat mode for interactive sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Ask questions about an uploaded PDF
    Document,

    /// Ask questions about an uploaded image
    Image,

    /// Summarise an uploaded video or a YouTube URL
    Video,
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "DOCUMENT"),
            Self::Image => write!(f, "IMAGE"),
            Self::Video => write!(f, "VIDEO"),
        }
    }
}

impl ChatMode {
    /// Parse a chat mode from a string
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the mode ("document", "image" or "video")
    ///
    /// # Returns
    ///
    /// Returns the parsed ChatMode or an error if the string is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use studyqa::chat::ChatMode;
    ///
    /// let mode = ChatMode::parse_str("Video").unwrap();
    /// assert_eq!(mode, ChatMode::Video);
    /// assert!(ChatMode::parse_str("audio").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "document" | "doc" | "pdf" => Ok(Self::Document),
            "image" | "img" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(format!("Unknown chat mode: {}", other)),
        }
    }

    /// Kind of file this mode uploads
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Document => MediaKind::Document,
            Self::Image => MediaKind::Image,
            Self::Video => MediaKind::Video,
        }
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Document => "Ask questions about a PDF document",
            Self::Image => "Ask questions about an image",
            Self::Video => "Summarise a video file or YouTube URL",
        }
    }

    /// Header title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Document => "Document Q&A Assistant",
            Self::Image => "Image Analysis",
            Self::Video => "Video AI Assistant",
        }
    }

    /// Header subtitle, depending on whether an artifact is loaded
    pub fn subtitle(&self, loaded: bool) -> &'static str {
        match (self, loaded) {
            (Self::Document, true) => "Document loaded - Ask anything about it",
            (Self::Document, false) => "Upload a PDF document to begin",
            (Self::Image, true) => "Image loaded - Ask anything about it",
            (Self::Image, false) => "Upload an image to begin",
            (Self::Video, _) => "Process a YouTube video or upload your own",
        }
    }

    /// Get a colored tag representation of this mode
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use studyqa::chat::ChatMode;
    ///
    /// println!("{}", ChatMode::Image.colored_tag());  // "[IMAGE]" in cyan
    /// ```
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Document => format!("[{}]", "DOCUMENT".purple()),
            Self::Image => format!("[{}]", "IMAGE".cyan()),
            Self::Video => format!("[{}]", "VIDEO".yellow()),
        }
    }

    /// Shell prompt for this mode
    pub fn prompt(&self) -> String {
        format!("{} >> ", self.colored_tag())
    }
}
