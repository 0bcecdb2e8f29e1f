//! Supabase GoTrue REST client
//!
//! Implements [`IdentityProvider`] against `{project}/auth/v1`. Every request
//! carries the project's anon key in the `apikey` header; user-scoped calls
//! add the access token as a bearer token.

use crate::auth::{IdentityProvider, Session, SignUpOutcome, TokenGrant, User};
use crate::config::IdentityConfig;
use crate::error::{Result, StudyQaError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

/// Token endpoint response: a grant plus the user it was issued to
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(flatten)]
    grant: TokenGrant,
    user: User,
}

/// GoTrue-backed identity provider
///
/// # Examples
///
/// ```
/// use studyqa::auth::{GoTrueClient, IdentityProvider};
/// use studyqa::config::IdentityConfig;
///
/// let config = IdentityConfig {
///     url: "https://project.supabase.co".to_string(),
///     anon_key: "anon".to_string(),
///     redirect_url: "http://localhost:3000/".to_string(),
/// };
/// let client = GoTrueClient::new(config).unwrap();
/// let url = client.authorize_url("google").unwrap();
/// assert_eq!(url.path(), "/auth/v1/authorize");
/// ```
pub struct GoTrueClient {
    client: Client,
    config: IdentityConfig,
}

impl GoTrueClient {
    /// Create a client for the configured project
    ///
    /// # Errors
    ///
    /// Returns [`StudyQaError::Config`] when the project URL or anon key is
    /// missing, or the HTTP client cannot be built.
    pub fn new(config: IdentityConfig) -> Result<Self> {
        if config.url.is_empty() || config.anon_key.is_empty() {
            return Err(StudyQaError::Config(
                "identity.url and identity.anon_key must be set to sign in".to_string(),
            )
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("studyqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StudyQaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized identity provider client: url={}", config.url);

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.config.url.trim_end_matches('/'), path)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.config.anon_key)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = self.with_key(request).send().await.map_err(|e| {
            tracing::warn!("{} request failed: {}", action, e);
            StudyQaError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("{} rejected with {}: {}", action, status, body);
        Err(StudyQaError::Authentication(
            provider_error_message(&body).unwrap_or_else(|| format!("{} failed ({})", action, status)),
        )
        .into())
    }

    async fn token(
        &self,
        grant_type: &str,
        body: serde_json::Value,
        action: &str,
    ) -> Result<Session> {
        let request = self
            .client
            .post(self.endpoint("/token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let response = self.send(request, action).await?;
        let token: TokenResponse = response.json().await.map_err(|e| {
            StudyQaError::Authentication(format!("Unexpected token response: {}", e))
        })?;
        Ok(token.grant.into_session(token.user))
    }
}

/// Pull a human-readable message out of a GoTrue error body
///
/// GoTrue has used `error_description`, `msg` and `message` over its
/// versions; the first one present wins.
pub fn provider_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        tracing::info!("Signing in {}", email);
        self.token(
            "password",
            serde_json::json!({ "email": email, "password": password }),
            "Sign in",
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        tracing::info!("Signing up {}", email);
        let request = self
            .client
            .post(self.endpoint("/signup"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response = self.send(request, "Sign up").await?;
        let value: serde_json::Value = response.json().await.map_err(|e| {
            StudyQaError::Authentication(format!("Unexpected sign-up response: {}", e))
        })?;

        // Auto-confirmed projects answer with a full token response, others
        // with the bare user awaiting email confirmation.
        if value.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(value)?;
            Ok(SignUpOutcome::SignedIn(token.grant.into_session(token.user)))
        } else {
            let user: User = match value.get("user") {
                Some(user) => serde_json::from_value(user.clone())?,
                None => serde_json::from_value(value)?,
            };
            Ok(SignUpOutcome::ConfirmationRequired(user))
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        tracing::debug!("Refreshing session");
        self.token(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
            "Refresh session",
        )
        .await
    }

    async fn get_user(&self, access_token: &str) -> Result<User> {
        let request = self
            .client
            .get(self.endpoint("/user"))
            .bearer_auth(access_token);
        let response = self.send(request, "Fetch user").await?;
        Ok(response.json().await.map_err(|e| {
            StudyQaError::Authentication(format!("Unexpected user response: {}", e))
        })?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self
            .client
            .post(self.endpoint("/logout"))
            .bearer_auth(access_token);
        self.send(request, "Sign out").await?;
        Ok(())
    }

    fn authorize_url(&self, provider: &str) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.endpoint("/authorize"))
            .map_err(|e| StudyQaError::Config(format!("Invalid identity.url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", &self.config.redirect_url);
        Ok(url)
    }
}
