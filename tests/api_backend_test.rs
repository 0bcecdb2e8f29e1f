//! Integration tests for the HTTP Q&A backend client
//!
//! A wiremock server stands in for the backend; the client is driven through
//! the `QaBackend` trait exactly as the chat modes use it.

mod common;

use studyqa::api::{HttpBackend, MediaKind, QaBackend, SelectedFile};
use studyqa::auth::AuthState;
use studyqa::config::ApiConfig;
use studyqa::error::{describe_failure, StudyQaError, INVALID_RESPONSE_MESSAGE};
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_exists, header_regex, method, path,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in(token: &str) -> watch::Receiver<AuthState> {
    // Receivers keep returning the last value after the sender is gone
    watch::channel(AuthState {
        session: Some(common::test_session(token)),
        loading: false,
    })
    .1
}

fn signed_out() -> watch::Receiver<AuthState> {
    watch::channel(AuthState {
        session: None,
        loading: false,
    })
    .1
}

fn backend(server: &MockServer, auth: watch::Receiver<AuthState>) -> HttpBackend {
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    HttpBackend::new(config, auth).expect("backend should build")
}

fn pdf(dir: &TempDir) -> SelectedFile {
    let path = common::write_file(dir.path(), "lecture.pdf", b"%PDF-1.4 lecture notes");
    SelectedFile::inspect(&path, MediaKind::Document, None).expect("pdf should be accepted")
}

#[tokio::test]
async fn test_upload_document_sends_multipart_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("filename=\"lecture.pdf\""))
        .and(body_string_contains("application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document_id": "doc-42",
            "page_count": 12,
            "message": "Document processed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let response = backend(&server, signed_in("tok-1"))
        .upload_document(&pdf(&dir))
        .await
        .unwrap();

    assert_eq!(response.document_id, "doc-42");
    assert_eq!(response.page_count, 12);
}

#[tokio::test]
async fn test_requests_without_session_carry_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/image-qa/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "A cat"
        })))
        .mount(&server)
        .await;

    let answer = backend(&server, signed_out())
        .ask_image("img-1", "What animal is this?")
        .await
        .unwrap();
    assert_eq!(answer.answer, "A cat");
    assert_eq!(answer.context_snippets, None);
}

#[tokio::test]
async fn test_token_is_read_at_request_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/video-qa/process-youtube"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response_text": "Summary",
            "message": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, rx) = watch::channel(AuthState {
        session: Some(common::test_session("first")),
        loading: false,
    });
    let client = backend(&server, rx);
    tx.send_replace(AuthState {
        session: Some(common::test_session("second")),
        loading: false,
    });

    let response = client
        .process_youtube("https://youtu.be/abc")
        .await
        .unwrap();
    assert_eq!(response.response_text, "Summary");
    assert!(response.timestamps.is_empty());
}

#[tokio::test]
async fn test_ask_document_uses_configured_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query"))
        .and(body_json(serde_json::json!({
            "question": "What is entropy?",
            "document_id": "doc-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "A measure of disorder.",
            "context": ["page 3: entropy is..."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiConfig {
        base_url: server.uri(),
        document_ask_path: "/api/v1/query".to_string(),
        ..ApiConfig::default()
    };
    let client = HttpBackend::new(config, signed_in("tok")).unwrap();
    let answer = client
        .ask_document("doc-1", "What is entropy?")
        .await
        .unwrap();

    assert_eq!(answer.answer, "A measure of disorder.");
    assert_eq!(
        answer.context,
        Some(vec!["page 3: entropy is...".to_string()])
    );
}

#[tokio::test]
async fn test_schema_mismatch_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document_id": "doc-1",
            "page_count": "twelve",
            "message": "ok"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = backend(&server, signed_in("tok"))
        .upload_document(&pdf(&dir))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StudyQaError>(),
        Some(StudyQaError::InvalidResponse { endpoint, .. }) if endpoint == "/api/v1/upload"
    ));
    assert_eq!(describe_failure("upload", &err), INVALID_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn test_error_detail_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ask"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "detail": "Document not found" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server, signed_in("tok"))
        .ask_document("gone", "Anything?")
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StudyQaError>(),
        Some(StudyQaError::Api { status: 404, .. })
    ));
    assert_eq!(describe_failure("question", &err), "Document not found");
}

#[tokio::test]
async fn test_error_without_detail_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image-qa/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let image = common::write_file(dir.path(), "diagram.png", b"not really a png");
    let file = SelectedFile::inspect(&image, MediaKind::Image, None).unwrap();
    let err = backend(&server, signed_in("tok"))
        .upload_image(&file)
        .await
        .unwrap_err();

    assert_eq!(
        describe_failure("image upload", &err),
        "Error processing image upload"
    );
}

#[tokio::test]
async fn test_youtube_timestamps_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/video-qa/process-youtube"))
        .and(body_json(serde_json::json!({ "url": "https://youtu.be/abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response_text": "Intro at 0:00, proof at 1:05",
            "message": "Video processed",
            "timestamps": [
                { "timestamp": "0:00", "start_seconds": 0, "embed_url": "https://www.youtube.com/embed/abc?start=0" },
                { "timestamp": "1:05", "start_seconds": 65, "embed_url": "https://www.youtube.com/embed/abc?start=65" }
            ]
        })))
        .mount(&server)
        .await;

    let response = backend(&server, signed_in("tok"))
        .process_youtube("https://youtu.be/abc")
        .await
        .unwrap();

    assert_eq!(response.timestamps.len(), 2);
    assert_eq!(response.timestamps[1].timestamp, "1:05");
    assert_eq!(response.timestamps[1].start_seconds, 65);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 5,
        ..ApiConfig::default()
    };
    let client = HttpBackend::new(config, signed_out()).unwrap();
    let err = client.process_youtube("https://youtu.be/x").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StudyQaError>(),
        Some(StudyQaError::Transport(_))
    ));
    assert_eq!(
        describe_failure("YouTube video", &err),
        "Error processing YouTube video"
    );
}
