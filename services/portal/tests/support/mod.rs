//! Shared fixtures for the portal integration tests

#![allow(dead_code)]

use std::sync::Arc;

use auth::SessionStore;
use auth::models::AccountKind;
use chrono::Duration;
use common::config::ClientConfig;
use portal::AppState;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
        redirect_delay_ms: 0,
        ..ClientConfig::default()
    }
}

/// State with nobody signed in
pub fn guest(server: &MockServer) -> AppState {
    let session = Arc::new(SessionStore::in_memory(Duration::days(30)));
    AppState::with_session(config_for(server), session).expect("Failed to build app state")
}

/// State signed in with [`TOKEN`]
pub fn signed_in(server: &MockServer, kind: AccountKind) -> AppState {
    let app = guest(server);
    app.session.sign_in(TOKEN, kind);
    app
}

pub fn posting(id: &str, title: &str, employment_type: &str, package: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "rating": 4,
        "companyLogoUrl": "https://logo.example/c.png",
        "location": "Hyderabad",
        "employmentType": employment_type,
        "packagePerAnnum": package,
        "jobDescription": "Work on things",
    })
}

pub fn profile() -> Value {
    json!({
        "name": "Asha Rao",
        "shortBio": "Backend engineer",
        "profileImageUrl": "",
    })
}
