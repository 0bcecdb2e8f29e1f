//! Session and user types issued by the identity provider

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned user id
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,

    /// Free-form profile data (name, avatar, ...)
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// Name to greet the user with: metadata `full_name`, then `name`, then email
    pub fn display_name(&self) -> String {
        ["full_name", "name"]
            .iter()
            .find_map(|key| self.user_metadata.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Credential bundle authorising API calls
///
/// Serialized with the absolute `expires_at` so a stored session can be
/// checked for expiry without contacting the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Returns `true` when the access token is expired or about to expire.
    ///
    /// A 60-second buffer is applied so a refresh happens before the backend
    /// starts rejecting the token. Sessions without `expires_at` never expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => expires_at
                .checked_sub_signed(Duration::seconds(60))
                .map_or(true, |deadline| Utc::now() >= deadline),
        }
    }
}

/// Token endpoint payload before it is turned into a [`Session`]
///
/// GoTrue returns `expires_in` and, in newer versions, `expires_at` as a
/// unix timestamp; the OAuth redirect fragment carries the same fields.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenGrant {
    /// Combine the grant with the user it belongs to
    ///
    /// An `expires_in` too large to represent as a timestamp leaves the
    /// session without an expiry.
    pub fn into_session(self, user: User) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .and_then(Duration::try_seconds)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            });
        Session {
            access_token: self.access_token,
            token_type: self.token_type,
            expires_at,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            user,
        }
    }
}
