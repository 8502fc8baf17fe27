//! Error types for the client

use common::validation::ValidationErrors;
use thiserror::Error;

/// Shown whenever the server could not be reached at all
pub const CONNECTIVITY_MESSAGE: &str = "Failed to connect to server";

/// Everything that can go wrong between a view and the remote API
#[derive(Error, Debug)]
pub enum ClientError {
    /// An auth-required operation was attempted without a live token
    #[error("Not signed in")]
    AuthRequired,

    /// The request never produced a response
    #[error("Request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request rejected with status {status}{}", suffix(.message))]
    RequestRejected { status: u16, message: Option<String> },

    /// The server answered with success but the body made no sense
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot have paths appended to it
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Client-side checks failed, nothing was sent
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ClientError {
    /// Text to surface in the view, `fallback` standing in for a missing server message
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::RequestFailed(_) => CONNECTIVITY_MESSAGE.to_string(),
            ClientError::RequestRejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::AuthRequired => "Please sign in again".to_string(),
            ClientError::ValidationFailed(errors) => errors.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server refused the credential itself
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::AuthRequired) || matches!(self.status(), Some(401 | 403))
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        ClientError::ValidationFailed(errors)
    }
}

/// Type alias for client results
pub type ClientResult<T> = Result<T, ClientError>;
