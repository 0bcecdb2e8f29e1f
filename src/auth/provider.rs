//! Identity provider seam

use crate::auth::{Session, User};
use crate::error::Result;
use async_trait::async_trait;

/// Result of a sign-up request
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account was auto-confirmed and a session issued
    SignedIn(Session),
    /// The account exists but the email address must be confirmed first
    ConfirmationRequired(User),
}

/// Operations consumed from the hosted identity provider
///
/// The client never computes or stores credentials itself; everything that
/// touches a password goes through this trait.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Password sign-in
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Create an account
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    /// Fetch the user an access token belongs to
    async fn get_user(&self, access_token: &str) -> Result<User>;

    /// Revoke the session server-side
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// URL that starts the OAuth redirect flow for `provider` (e.g. "google")
    fn authorize_url(&self, provider: &str) -> Result<url::Url>;
}
