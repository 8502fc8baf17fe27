//! Session handling for the Jobby client
//!
//! Holds the credential and role of whoever is signed in, and the route guard
//! that every view consults before it loads anything.

pub mod guard;
pub mod models;
pub mod session;
pub mod validation;

pub use guard::{Access, GuardDecision, RouteGuard, View, can_enter};
pub use session::SessionStore;
