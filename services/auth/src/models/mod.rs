//! Authentication models

pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use role::{AccountKind, Role};
pub use session::{Session, SessionStatus, StoredSession};
pub use user::{LoginCredentials, SignupRequest, TokenResponse};
