//! Integration tests for the GoTrue identity provider client

mod common;

use studyqa::auth::{GoTrueClient, IdentityProvider, SignUpOutcome};
use studyqa::config::IdentityConfig;
use studyqa::error::StudyQaError;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GoTrueClient {
    GoTrueClient::new(IdentityConfig {
        url: server.uri(),
        anon_key: "anon-key".to_string(),
        redirect_url: "http://localhost:3000/".to_string(),
    })
    .expect("client should build")
}

#[tokio::test]
async fn test_password_sign_in_sends_grant_and_apikey() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "hunter22"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::token_body("tok-1", "ada@example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .sign_in_with_password("ada@example.com", "hunter22")
        .await
        .unwrap();

    assert_eq!(session.access_token, "tok-1");
    assert_eq!(session.refresh_token.as_deref(), Some("tok-1-refresh"));
    assert_eq!(session.user.display_name(), "Ada Student");
    assert!(!session.is_expired());
}

#[tokio::test]
async fn test_rejected_sign_in_reports_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .sign_in_with_password("ada@example.com", "wrong")
        .await
        .unwrap_err();

    match err.downcast_ref::<StudyQaError>() {
        Some(StudyQaError::Authentication(message)) => {
            assert_eq!(message, "Invalid login credentials")
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sign_up_awaiting_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "user-new",
            "email": "new@example.com",
            "confirmation_sent_at": "2024-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let outcome = client(&server)
        .sign_up("new@example.com", "password1")
        .await
        .unwrap();

    match outcome {
        SignUpOutcome::ConfirmationRequired(user) => {
            assert_eq!(user.id, "user-new");
            assert_eq!(user.email.as_deref(), Some("new@example.com"));
        }
        other => panic!("expected confirmation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sign_up_auto_confirmed_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::token_body("tok-new", "new@example.com")),
        )
        .mount(&server)
        .await;

    let outcome = client(&server)
        .sign_up("new@example.com", "password1")
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SignUpOutcome::SignedIn(ref session) if session.access_token == "tok-new"
    ));
}

#[tokio::test]
async fn test_duplicate_sign_up_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "code": 422,
            "msg": "User already registered"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .sign_up("ada@example.com", "password1")
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("User already registered"));
}

#[tokio::test]
async fn test_refresh_uses_refresh_token_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(serde_json::json!({ "refresh_token": "old-refresh" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::token_body("tok-2", "ada@example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server).refresh_session("old-refresh").await.unwrap();
    assert_eq!(session.access_token, "tok-2");
}

#[tokio::test]
async fn test_refresh_failure_names_the_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .refresh_session("old-refresh")
        .await
        .unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Refresh session failed"), "{}", message);
    assert!(!message.contains("Sign in"), "{}", message);
}

#[tokio::test]
async fn test_get_user_and_sign_out_send_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "user-1",
            "email": "ada@example.com",
            "created_at": "2024-02-03T04:05:06Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = client(&server);
    let user = provider.get_user("tok-1").await.unwrap();
    assert_eq!(user.id, "user-1");
    assert!(user.created_at.is_some());

    provider.sign_out("tok-1").await.unwrap();
}

#[test]
fn test_authorize_url_targets_google() {
    let provider = GoTrueClient::new(IdentityConfig {
        url: "https://project.supabase.co".to_string(),
        anon_key: "anon".to_string(),
        redirect_url: "http://localhost:3000/".to_string(),
    })
    .unwrap();

    let url = provider.authorize_url("google").unwrap();
    assert_eq!(url.path(), "/auth/v1/authorize");
    assert!(url.as_str().contains("provider=google"));
}
