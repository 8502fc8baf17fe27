//! Session model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::role::{AccountKind, Role};

/// Credential held by the client
///
/// A token is present exactly when the role is not [`Role::Guest`]; the
/// constructors are the only way to build one, so that cannot be broken.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    role: Role,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn signed_in(token: String, kind: AccountKind, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: Some(token),
            role: kind.into(),
            expires_at: Some(expires_at),
        }
    }

    /// The token, unless it has expired at `now`
    pub fn token_at(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.is_expired_at(now) {
            return None;
        }
        self.token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// What the guard sees; an expired token reads exactly like no token
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        match self.token_at(now) {
            Some(_) => SessionStatus {
                authenticated: true,
                role: self.role,
            },
            None => SessionStatus::guest(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Synchronous snapshot of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub role: Role,
}

impl SessionStatus {
    pub fn guest() -> Self {
        Self {
            authenticated: false,
            role: Role::Guest,
        }
    }
}

/// On-disk form of a signed-in session, written as one entry
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub token: String,
    pub role: AccountKind,
    pub expires_at: DateTime<Utc>,
}
