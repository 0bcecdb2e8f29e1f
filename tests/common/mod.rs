use chrono::{Duration, Timelike, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use studyqa::auth::{FileSessionStore, Session, SessionStore, User};
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write test file");
    path
}

#[allow(dead_code)]
pub fn test_user(email: &str) -> User {
    User {
        id: format!("user-{}", email),
        email: Some(email.to_string()),
        created_at: None,
        last_sign_in_at: None,
        user_metadata: serde_json::Value::Null,
    }
}

#[allow(dead_code)]
pub fn test_session(token: &str) -> Session {
    Session {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
        expires_at: (Utc::now() + Duration::hours(1)).with_nanosecond(0),
        refresh_token: Some(format!("{}-refresh", token)),
        user: test_user("student@example.com"),
    }
}

/// Store `session` in a file-backed session store under `dir`
#[allow(dead_code)]
pub fn stored_session(dir: &Path, session: &Session) -> PathBuf {
    let path = dir.join("session.json");
    FileSessionStore::new(path.clone())
        .save(session)
        .expect("failed to store session");
    path
}

/// GoTrue token response for `token`
#[allow(dead_code)]
pub fn token_body(token: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": format!("{}-refresh", token),
        "user": {
            "id": format!("user-{}", email),
            "email": email,
            "user_metadata": { "full_name": "Ada Student" }
        }
    })
}
