//! Session store: the single owner of the client's credential
//!
//! Every component that needs to know who is signed in reads it from here,
//! and only sign-in and sign-out write to it. The session is persisted as one
//! entry so that both fields always reload together.

use chrono::{Duration, Utc};
use common::store::{KeyValueStore, MemoryStore};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::models::{AccountKind, Session, SessionStatus, StoredSession};

const SESSION_KEY: &str = "session";

/// Session store backed by a key/value store with expiry
pub struct SessionStore {
    state: RwLock<Session>,
    store: Box<dyn KeyValueStore>,
    ttl: Duration,
}

impl SessionStore {
    /// Open the session store, restoring whatever a previous run left behind
    pub fn open(store: Box<dyn KeyValueStore>, ttl: Duration) -> Self {
        let session = Self::restore(store.as_ref());
        debug!("Session restored, role: {}", session.status_at(Utc::now()).role);

        Self {
            state: RwLock::new(session),
            store,
            ttl,
        }
    }

    /// A store that forgets everything when the process exits
    pub fn in_memory(ttl: Duration) -> Self {
        Self::open(Box::new(MemoryStore::new()), ttl)
    }

    fn restore(store: &dyn KeyValueStore) -> Session {
        let raw = match store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Session::guest(),
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                return Session::guest();
            }
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if !stored.token.is_empty() && stored.expires_at > Utc::now() => {
                Session::signed_in(stored.token, stored.role, stored.expires_at)
            }
            Ok(_) => {
                debug!("Persisted session is empty or expired, discarding");
                Self::discard(store);
                Session::guest()
            }
            Err(e) => {
                warn!("Persisted session is unreadable, discarding: {}", e);
                Self::discard(store);
                Session::guest()
            }
        }
    }

    fn discard(store: &dyn KeyValueStore) {
        if let Err(e) = store.delete(SESSION_KEY) {
            warn!("Failed to delete persisted session: {}", e);
        }
    }

    /// Store a new credential and role, replacing any previous one
    pub fn sign_in(&self, token: impl Into<String>, kind: AccountKind) {
        let token = token.into();
        if token.trim().is_empty() {
            warn!("Ignoring sign-in with an empty token");
            self.sign_out();
            return;
        }

        let expires_at = Utc::now() + self.ttl;
        let stored = StoredSession {
            token: token.clone(),
            role: kind,
            expires_at,
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Session::signed_in(token, kind, expires_at);

        match serde_json::to_string(&stored) {
            Ok(raw) => {
                if let Err(e) = self.store.set_until(SESSION_KEY, &raw, Some(expires_at)) {
                    warn!("Failed to persist session: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode session: {}", e),
        }

        info!("Signed in as {}, session valid until {}", kind, expires_at);
    }

    /// Forget the credential and role together
    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Session::guest();
        Self::discard(self.store.as_ref());

        info!("Signed out");
    }

    /// Current status, no I/O
    pub fn current(&self) -> SessionStatus {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status_at(Utc::now())
    }

    /// Bearer token to attach to requests, if the session is still valid
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token_at(Utc::now())
            .map(str::to_string)
    }
}
