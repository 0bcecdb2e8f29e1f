//! Global authentication context
//!
//! Mirrors the identity provider's session locally and publishes every
//! change through a `tokio::sync::watch` channel. Readers (the Q&A backend
//! client, the route guard, the shell prompt) hold a receiver and always see
//! the latest state; only this context writes to it.

use crate::auth::{IdentityProvider, Session, SessionStore, SignUpOutcome, TokenGrant, User};
use crate::error::{Result, StudyQaError};
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the authentication state
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    /// `true` until the stored session has been looked up
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

impl AuthState {
    /// User derived from the session
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Owner of the authentication state
pub struct AuthContext {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    /// Create a context in the loading state
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            provider,
            store,
            state,
        }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Current session, if signed in
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    fn publish(&self, session: Option<Session>) {
        self.state.send_replace(AuthState {
            session,
            loading: false,
        });
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session) {
            tracing::warn!("Failed to persist session: {:#}", e);
        }
    }

    /// Restore the stored session
    ///
    /// An expired session is refreshed when it carries a refresh token and
    /// discarded otherwise. A store that cannot be read counts as signed out.
    pub async fn initialize(&self) -> Result<()> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to load stored session: {:#}", e);
                None
            }
        };

        let session = match stored {
            Some(session) if session.is_expired() => self.refresh(session).await,
            other => other,
        };

        if let Some(session) = &session {
            tracing::info!("Restored session for {}", session.user.display_name());
        }
        self.publish(session);
        Ok(())
    }

    async fn refresh(&self, expired: Session) -> Option<Session> {
        let refresh_token = expired.refresh_token.as_deref()?;
        match self.provider.refresh_session(refresh_token).await {
            Ok(session) => {
                tracing::info!("Refreshed expired session");
                self.persist(&session);
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Session refresh failed, signing out: {:#}", e);
                if let Err(e) = self.store.clear() {
                    tracing::warn!("Failed to clear stored session: {:#}", e);
                }
                None
            }
        }
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        self.persist(&session);
        self.publish(Some(session.clone()));
        Ok(session)
    }

    /// Create an account; signs in when the provider issues a session
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let outcome = self.provider.sign_up(email, password).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.persist(session);
            self.publish(Some(session.clone()));
        }
        Ok(outcome)
    }

    /// URL to open in a browser to sign in with Google
    pub fn google_sign_in_url(&self) -> Result<url::Url> {
        self.provider.authorize_url("google")
    }

    /// Finish an OAuth sign-in from the URL the browser was redirected to
    ///
    /// The provider puts the tokens in the URL fragment; an `error` there
    /// (e.g. the user cancelled) is reported as an authentication error.
    pub async fn complete_oauth(&self, redirect: &str) -> Result<Session> {
        let grant = parse_oauth_redirect(redirect)?;
        let user = self.provider.get_user(&grant.access_token).await?;
        let session = grant.into_session(user);
        self.persist(&session);
        self.publish(Some(session.clone()));
        Ok(session)
    }

    /// Sign out
    ///
    /// Local state and the stored session are cleared even when the provider
    /// cannot be reached to revoke the token.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.session() {
            if let Err(e) = self.provider.sign_out(&session.access_token).await {
                tracing::warn!("Remote sign-out failed: {:#}", e);
            }
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored session: {:#}", e);
        }
        self.publish(None);
        tracing::info!("Signed out");
        Ok(())
    }
}

/// Parse the token grant out of an OAuth redirect URL
///
/// # Examples
///
/// ```
/// use studyqa::auth::parse_oauth_redirect;
///
/// let grant = parse_oauth_redirect(
///     "http://localhost:3000/#access_token=abc&expires_in=3600&refresh_token=r&token_type=bearer",
/// )
/// .unwrap();
/// assert_eq!(grant.access_token, "abc");
/// assert_eq!(grant.expires_in, Some(3600));
/// ```
pub fn parse_oauth_redirect(redirect: &str) -> Result<TokenGrant> {
    let url = url::Url::parse(redirect.trim())
        .map_err(|e| StudyQaError::Authentication(format!("Invalid redirect URL: {}", e)))?;

    // Tokens arrive in the fragment; errors may arrive in either part.
    let fragment = url.fragment().unwrap_or_default();
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(fragment.as_bytes())
        .chain(url.query_pairs())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if let Some(error) = get("error") {
        let description = get("error_description").unwrap_or(error);
        return Err(StudyQaError::Authentication(description).into());
    }

    let access_token = get("access_token").ok_or_else(|| {
        StudyQaError::Authentication("Redirect URL does not contain an access token".to_string())
    })?;

    Ok(TokenGrant {
        access_token,
        token_type: get("token_type").unwrap_or_else(|| "bearer".to_string()),
        expires_in: get("expires_in").and_then(|v| v.parse().ok()),
        expires_at: get("expires_at").and_then(|v| v.parse().ok()),
        refresh_token: get("refresh_token"),
    })
}
