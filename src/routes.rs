//! Route table
//!
//! Paths name the screens of the study assistant. Legacy `-qa` chat paths
//! redirect to their `-chat` equivalents and unknown paths redirect to `/`.
//! Chat screens and the profile require a session; without one navigation
//! lands on `/signin`.

use crate::chat::ChatMode;
use std::fmt;

/// A resolved screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Pricing,
    Features,
    SignIn,
    SignUp,
    Profile,
    DocumentChat,
    ImageChat,
    VideoChat,
    /// Placeholder for the upcoming audio feature
    AudioQa,
}

const ROUTES: &[(&str, Route)] = &[
    ("/", Route::Home),
    ("/pricing", Route::Pricing),
    ("/features", Route::Features),
    ("/signin", Route::SignIn),
    ("/signup", Route::SignUp),
    ("/profile", Route::Profile),
    ("/document-chat", Route::DocumentChat),
    ("/image-chat", Route::ImageChat),
    ("/video-chat", Route::VideoChat),
    ("/audio-qa", Route::AudioQa),
];

const LEGACY_REDIRECTS: &[(&str, Route)] = &[
    ("/document-qa", Route::DocumentChat),
    ("/image-qa", Route::ImageChat),
    ("/video-qa", Route::VideoChat),
];

impl Route {
    /// Canonical path of the route
    pub fn path(&self) -> &'static str {
        ROUTES
            .iter()
            .find(|(_, route)| route == self)
            .map(|(path, _)| *path)
            .unwrap_or("/")
    }

    /// Whether the route needs a signed-in user
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Profile | Self::DocumentChat | Self::ImageChat | Self::VideoChat | Self::AudioQa
        )
    }

    /// Chat mode the route opens, if it is a chat screen
    pub fn chat_mode(&self) -> Option<ChatMode> {
        match self {
            Self::DocumentChat => Some(ChatMode::Document),
            Self::ImageChat => Some(ChatMode::Image),
            Self::VideoChat => Some(ChatMode::Video),
            _ => None,
        }
    }

    /// Route of the chat screen for `mode`
    pub fn for_mode(mode: ChatMode) -> Self {
        match mode {
            ChatMode::Document => Self::DocumentChat,
            ChatMode::Image => Self::ImageChat,
            ChatMode::Video => Self::VideoChat,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Reduce a path to its comparable form
///
/// Drops the query string and fragment, trailing slashes and case.
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    let with_root = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };
    with_root.to_lowercase()
}

/// Resolve a path to a route, following legacy redirects and the catch-all
///
/// # Examples
///
/// ```
/// use studyqa::routes::{resolve, Route};
///
/// assert_eq!(resolve("/document-qa"), Route::DocumentChat);
/// assert_eq!(resolve("/image-chat?tab=1"), Route::ImageChat);
/// assert_eq!(resolve("/nowhere"), Route::Home);
/// ```
pub fn resolve(path: &str) -> Route {
    let path = normalize(path);
    ROUTES
        .iter()
        .chain(LEGACY_REDIRECTS.iter())
        .find(|(known, _)| *known == path)
        .map(|(_, route)| *route)
        .unwrap_or_else(|| {
            tracing::debug!("Unknown route {}, redirecting to /", path);
            Route::Home
        })
}

/// Redirect protected routes to sign-in when there is no session
pub fn guard(route: Route, authenticated: bool) -> Route {
    if route.is_protected() && !authenticated {
        tracing::debug!("{} requires a session, redirecting to /signin", route);
        Route::SignIn
    } else {
        route
    }
}

/// Resolve `path` and apply the session guard
pub fn navigate(path: &str, authenticated: bool) -> Route {
    guard(resolve(path), authenticated)
}
