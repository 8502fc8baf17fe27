//! Application state shared by every view

use std::sync::Arc;

use auth::{GuardDecision, RouteGuard, SessionStore, View};
use common::config::ClientConfig;
use common::store::FileStore;
use tracing::warn;

use crate::error::ClientResult;
use crate::gateway::Gateway;
use crate::view::Entry;

/// Everything a view needs: the session, the gateway and the guard
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionStore>,
    pub gateway: Gateway,
    pub guard: RouteGuard,
}

impl AppState {
    /// Build the state with the session persisted where the config says
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let session = match FileStore::open(config.session_file.clone()) {
            Ok(store) => SessionStore::open(Box::new(store), config.session_ttl()),
            Err(e) => {
                warn!("Session will not persist: {}", e);
                SessionStore::in_memory(config.session_ttl())
            }
        };

        Self::with_session(config, Arc::new(session))
    }

    pub fn with_session(config: ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let gateway = Gateway::new(&config, Arc::clone(&session))?;
        let guard = RouteGuard::new(Arc::clone(&session));

        Ok(Self {
            config: Arc::new(config),
            session,
            gateway,
            guard,
        })
    }

    /// Consult the guard and only build the view when entry is allowed
    pub fn enter<V>(&self, view: &View, build: impl FnOnce() -> V) -> Entry<V> {
        match self.guard.check(view) {
            GuardDecision::Allow => Entry::Entered(build()),
            GuardDecision::RedirectTo(target) => Entry::Redirected(target),
        }
    }
}
