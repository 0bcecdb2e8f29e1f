//! Local file inspection before upload
//!
//! Each chat mode accepts a different kind of file. Inspection checks the
//! kind and derives the MIME type sent with the multipart part, so the
//! backend never receives a file its route would reject on content type.

use crate::error::{Result, StudyQaError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of file a chat mode uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// PDF document
    Document,
    /// Any image format the `image` crate recognises
    Image,
    /// Video container
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

const VIDEO_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
];

/// A file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    /// File name sent in the multipart part
    pub file_name: String,
    pub mime: String,
    /// Size at selection time (bytes)
    pub size: u64,
}

impl SelectedFile {
    /// Inspect `path` for upload as `kind`
    ///
    /// # Arguments
    ///
    /// * `path` - File to inspect
    /// * `kind` - Kind the current mode accepts
    /// * `max_bytes` - Optional size ceiling
    ///
    /// # Errors
    ///
    /// Returns [`StudyQaError::InvalidFile`] when the file is missing, is a
    /// directory, has the wrong type, or exceeds `max_bytes`.
    pub fn inspect(path: &Path, kind: MediaKind, max_bytes: Option<u64>) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            StudyQaError::InvalidFile(format!("Cannot read {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(
                StudyQaError::InvalidFile(format!("{} is not a file", path.display())).into(),
            );
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                StudyQaError::InvalidFile(format!("{} has no file name", path.display()))
            })?;

        let mime = mime_for(path, kind)?;

        if let Some(limit) = max_bytes {
            if metadata.len() > limit {
                return Err(StudyQaError::InvalidFile(format!(
                    "{} is {} bytes; the limit is {} bytes",
                    file_name,
                    metadata.len(),
                    limit
                ))
                .into());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            mime,
            size: metadata.len(),
        })
    }

    /// Read the file contents for upload
    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

fn mime_for(path: &Path, kind: MediaKind) -> Result<String> {
    match kind {
        MediaKind::Document => match extension(path).as_deref() {
            Some("pdf") => Ok("application/pdf".to_string()),
            _ => Err(StudyQaError::InvalidFile("Only PDF files are allowed".to_string()).into()),
        },
        MediaKind::Image => image::ImageFormat::from_path(path)
            .map(|format| format.to_mime_type().to_string())
            .map_err(|_| {
                StudyQaError::InvalidFile(format!(
                    "{} is not a supported image format",
                    path.display()
                ))
                .into()
            }),
        MediaKind::Video => {
            let ext = extension(path);
            VIDEO_TYPES
                .iter()
                .find(|(known, _)| Some(*known) == ext.as_deref())
                .map(|(_, mime)| mime.to_string())
                .ok_or_else(|| {
                    StudyQaError::InvalidFile(
                        "Only .mp4, .mov, .avi and .mkv videos are allowed".to_string(),
                    )
                    .into()
                })
        }
    }
}
