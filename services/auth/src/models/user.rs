//! Account payloads exchanged with the sign-up and sign-in endpoints

use serde::{Deserialize, Serialize};

/// New account registration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub name: String,
}

/// Sign-in credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Successful sign-in answer
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}
