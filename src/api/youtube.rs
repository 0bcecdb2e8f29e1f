//! YouTube URL helpers used for the video preview link

use regex::Regex;
use std::sync::OnceLock;

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:watch\?v=|embed/)|youtu\.be/)([^\s&?#]+)",
        )
        .expect("video id pattern is valid")
    })
}

/// Extract the video id from a YouTube watch, embed or short URL
///
/// # Examples
///
/// ```
/// use studyqa::api::youtube::extract_video_id;
///
/// assert_eq!(
///     extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10"),
///     Some("dQw4w9WgXcQ".to_string())
/// );
/// assert_eq!(extract_video_id("https://youtu.be/abc123"), Some("abc123".to_string()));
/// assert_eq!(extract_video_id("https://vimeo.com/42"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Embeddable player URL for a video id
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", video_id)
}
