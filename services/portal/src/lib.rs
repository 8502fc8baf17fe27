//! Jobby job portal client
//!
//! Talks to the Jobby REST API on behalf of one person. Each page of the
//! portal is a view struct that consults the route guard on entry, owns its
//! own state and turns every API failure into view-local state.

pub mod admin;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod inflight;
pub mod lifecycle;
pub mod login;
pub mod models;
pub mod profile;
pub mod state;
pub mod view;

pub use admin::{AdminJobsView, DashboardStats, JobEditor, JobForm, Redirect, SubmitOutcome};
pub use catalog::{CatalogView, FilterCriteria, apply_filter, parse_salary_lpa};
pub use error::{ClientError, ClientResult};
pub use gateway::{Gateway, Operation};
pub use lifecycle::{ApplicationsView, ApplyOutcome, JobDetailsView};
pub use login::{LoginOutcome, LoginView, SignupOutcome, sign_out};
pub use profile::{ProfileView, SaveOutcome};
pub use state::AppState;
pub use view::{Confirm, Entry, Notice, Phase, RemoveOutcome};
