use super::*;
use crate::net::types::LoginData;
use crate::state::session::ProfileFailurePolicy;
use crate::token_store::MemoryTokenStore;

use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/login", post(|| async { Json(json!({"message": "Login successful", "access_token": "tok-app"})) }))
        .route(
            "/get-info",
            get(|| async {
                Json(json!({"user_info": {
                    "name": "Ada",
                    "email": "ada@example.com",
                    "membership": "Pro",
                    "membership_type": "monthly",
                    "word_limit": 50000,
                    "words_used": 120,
                    "is_admin": false,
                    "expiration_date": "2026-11-18",
                    "days_remaining": 31
                }}))
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[test]
fn policy_comes_from_config() {
    let mut config = ClientConfig::with_token_file("/unused/token");
    config.profile_freshness = Duration::from_secs(5);
    config.profile_failure = ProfileFailurePolicy::ClearSession;

    let state = AppState::with_token_store(config, Arc::new(MemoryTokenStore::new())).unwrap();
    let policy = state.session.policy();
    assert_eq!(policy.freshness, Duration::from_secs(5));
    assert_eq!(policy.on_profile_failure, ProfileFailurePolicy::ClearSession);
}

#[test]
fn api_client_uses_normalized_url() {
    let mut config = ClientConfig::with_token_file("/unused/token");
    config.api_url = "https://api.example.com/".into();
    let state = AppState::with_token_store(config, Arc::new(MemoryTokenStore::new())).unwrap();
    assert_eq!(state.api.base_url(), "https://api.example.com");
}

#[test]
fn from_config_persists_tokens_to_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("token");
    let state = AppState::from_config(ClientConfig::with_token_file(&path)).unwrap();

    state.tokens.save("abc").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
}

#[tokio::test]
async fn login_through_app_state_shares_the_token_store() {
    let mut config = ClientConfig::with_token_file("/unused/token");
    config.api_url = spawn_backend().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let state = AppState::with_token_store(config, tokens.clone()).unwrap();

    state
        .session
        .login(&LoginData { email: "ada@example.com".into(), password: "pw".into() })
        .await
        .unwrap();

    assert_eq!(tokens.read().unwrap().as_deref(), Some("tok-app"));
    let snap = state.session.snapshot();
    assert!(snap.is_authenticated);
    assert_eq!(snap.user.unwrap().words_used, 120);
}
