//! HTTP-level behaviour of the gateway: headers, paths and error mapping

mod support;

use std::sync::Arc;

use auth::SessionStore;
use auth::models::AccountKind;
use chrono::Duration;
use common::config::ClientConfig;
use portal::{AppState, ClientError};
use portal::error::CONNECTIVITY_MESSAGE;
use serde_json::json;
use support::{TOKEN, guest, posting, signed_in};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/jobs"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [posting("j1", "Data Engineer", "Full Time", "10 LPA")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = signed_in(&server, AccountKind::User);
    let jobs = app.gateway.list_jobs().await.expect("jobs should load");

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "j1");
}

#[tokio::test]
async fn test_protected_operation_without_session_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/jobs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = guest(&server);
    let err = app.gateway.list_jobs().await.unwrap_err();

    assert!(matches!(err, ClientError::AuthRequired));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_sign_in_needs_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/signin"))
        .and(body_json(json!({"username": "boss", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "ok", "token": "abc"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = guest(&server);
    let credentials = auth::models::LoginCredentials {
        username: "boss".to_string(),
        password: "secret".to_string(),
    };
    let answer = app
        .gateway
        .sign_in(AccountKind::Admin, &credentials)
        .await
        .expect("sign-in should succeed");

    assert_eq!(answer.token, "abc");
}

#[tokio::test]
async fn test_rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/jobs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Job not found"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/jobApplication/a1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = signed_in(&server, AccountKind::User);

    let err = app.gateway.job_details("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message("fallback"), "Job not found");

    let err = app.gateway.withdraw_application("a1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(
        err.user_message("Failed to delete application"),
        "Failed to delete application"
    );
}

#[tokio::test]
async fn test_expired_credential_reported_as_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid token"})))
        .mount(&server)
        .await;

    let app = signed_in(&server, AccountKind::User);
    let err = app.gateway.get_profile().await.unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(err.user_message("Failed to fetch profile"), "Invalid token");
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let app = signed_in(&server, AccountKind::Admin);
    let err = app.gateway.admin_list_jobs().await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse(_)));
    assert_eq!(err.user_message("Failed to fetch jobs"), "Failed to fetch jobs");
}

#[tokio::test]
async fn test_unreachable_server_is_a_connectivity_failure() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        request_timeout_secs: 5,
        ..ClientConfig::default()
    };
    let session = Arc::new(SessionStore::in_memory(Duration::days(30)));
    session.sign_in(TOKEN, AccountKind::User);
    let app = AppState::with_session(config, session).unwrap();

    let err = app.gateway.list_jobs().await.unwrap_err();

    assert!(matches!(err, ClientError::RequestFailed(_)));
    assert_eq!(err.user_message("Failed to fetch jobs"), CONNECTIVITY_MESSAGE);
}
