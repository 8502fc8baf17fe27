//! Sign-up, sign-in and sign-out

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use auth::guard::{HOME_PATH, SIGN_IN_PATH};
use auth::models::{AccountKind, LoginCredentials, SignupRequest};
use auth::validation::{validate_credentials, validate_signup};
use auth::{SessionStore, View};
use common::validation::ValidationErrors;
use tracing::{info, warn};

use crate::gateway::Gateway;
use crate::state::AppState;
use crate::view::{Entry, Notice};

pub const SIGNUP_SUCCESS: &str = "Signup successful! Please login.";
const SIGNIN_FALLBACK: &str = "An error occurred";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session stored; navigate to `redirect`
    SignedIn { redirect: &'static str },
    Invalid(ValidationErrors),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Account created, the caller still has to sign in
    Registered(String),
    Invalid(ValidationErrors),
    Failed(String),
}

/// The sign-in page for one account kind
pub struct LoginView {
    gateway: Gateway,
    session: Arc<SessionStore>,
    kind: AccountKind,
    notice: Mutex<Option<Notice>>,
}

impl LoginView {
    /// Signed-in visitors are sent home instead
    pub fn open(app: &AppState, kind: AccountKind) -> Entry<Self> {
        app.enter(&View::Login(kind), || Self {
            gateway: app.gateway.clone(),
            session: Arc::clone(&app.session),
            kind,
            notice: Mutex::new(None),
        })
    }

    fn notice_slot(&self) -> MutexGuard<'_, Option<Notice>> {
        self.notice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice_slot().clone()
    }

    pub async fn sign_in(&self, credentials: &LoginCredentials) -> LoginOutcome {
        if let Err(errors) = validate_credentials(credentials) {
            return LoginOutcome::Invalid(errors);
        }

        match self.gateway.sign_in(self.kind, credentials).await {
            Ok(answer) if !answer.token.trim().is_empty() => {
                self.session.sign_in(answer.token, self.kind);
                info!("{} {} signed in", self.kind, credentials.username);
                *self.notice_slot() = None;
                LoginOutcome::SignedIn {
                    redirect: HOME_PATH,
                }
            }
            Ok(_) => {
                warn!("Sign-in answer carried no token");
                self.fail(SIGNIN_FALLBACK.to_string())
            }
            Err(e) => {
                warn!("Sign-in for {} failed: {}", credentials.username, e);
                self.fail(e.user_message(SIGNIN_FALLBACK))
            }
        }
    }

    pub async fn sign_up(&self, request: &SignupRequest) -> SignupOutcome {
        if let Err(errors) = validate_signup(request) {
            return SignupOutcome::Invalid(errors);
        }

        match self.gateway.sign_up(self.kind, request).await {
            Ok(()) => {
                info!("Registered {} {}", self.kind, request.username);
                *self.notice_slot() = Some(Notice::Success(SIGNUP_SUCCESS.to_string()));
                SignupOutcome::Registered(SIGNUP_SUCCESS.to_string())
            }
            Err(e) => {
                let message = e.user_message(SIGNIN_FALLBACK);
                *self.notice_slot() = Some(Notice::Error(message.clone()));
                SignupOutcome::Failed(message)
            }
        }
    }

    fn fail(&self, message: String) -> LoginOutcome {
        *self.notice_slot() = Some(Notice::Error(message.clone()));
        LoginOutcome::Failed(message)
    }
}

/// Forget the session; returns where to navigate next
pub fn sign_out(app: &AppState) -> &'static str {
    app.session.sign_out();
    SIGN_IN_PATH
}
