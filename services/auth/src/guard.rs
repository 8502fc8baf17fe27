//! Route guard: one authorization policy for every navigable view
//!
//! Views ask the guard before fetching or showing anything. The policy only
//! looks at the synchronous session status, so an expired token is handled
//! exactly like a missing one.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::{AccountKind, Role, SessionStatus};
use crate::session::SessionStore;

/// Where unauthenticated visitors are sent
pub const SIGN_IN_PATH: &str = "/";
/// Where signed-in visitors without the required role are sent
pub const HOME_PATH: &str = "/home";

/// What a view demands of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sign-in pages; a signed-in visitor has nothing to do there
    GuestOnly,
    /// Any signed-in role
    Authenticated,
    /// Admin role only
    Admin,
}

/// Outcome of a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(&'static str),
}

/// Evaluate the policy; the first matching rule wins
pub fn can_enter(status: &SessionStatus, required: Access) -> GuardDecision {
    let needs_session = matches!(required, Access::Authenticated | Access::Admin);
    if needs_session && !status.authenticated {
        return GuardDecision::RedirectTo(SIGN_IN_PATH);
    }

    if required == Access::Admin && status.role != Role::Admin {
        return GuardDecision::RedirectTo(HOME_PATH);
    }

    if required == Access::GuestOnly && status.authenticated {
        return GuardDecision::RedirectTo(HOME_PATH);
    }

    GuardDecision::Allow
}

/// Every navigable view of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    SignIn,
    Login(AccountKind),
    Home,
    Jobs,
    JobDetails(String),
    Applications,
    Profile,
    AdminDashboard,
    AdminJobs,
    AdminCreateJob,
    AdminEditJob(String),
}

impl View {
    pub fn access(&self) -> Access {
        match self {
            View::SignIn | View::Login(_) => Access::GuestOnly,
            View::Home
            | View::Jobs
            | View::JobDetails(_)
            | View::Applications
            | View::Profile => Access::Authenticated,
            View::AdminDashboard | View::AdminJobs | View::AdminCreateJob | View::AdminEditJob(_) => {
                Access::Admin
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            View::SignIn => SIGN_IN_PATH.to_string(),
            View::Login(kind) => format!("/login/{}", kind),
            View::Home => HOME_PATH.to_string(),
            View::Jobs => "/jobs".to_string(),
            View::JobDetails(id) => format!("/jobs/{}", id),
            View::Applications => "/applications".to_string(),
            View::Profile => "/profile".to_string(),
            View::AdminDashboard => "/admin/dashboard".to_string(),
            View::AdminJobs => "/admin/jobs".to_string(),
            View::AdminCreateJob => "/admin/jobs/create".to_string(),
            View::AdminEditJob(id) => format!("/admin/jobs/edit/{}", id),
        }
    }

    /// Resolve a path back to its view
    pub fn from_path(path: &str) -> Option<View> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(View::SignIn);
        }

        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["login", kind] => kind.parse().ok().map(View::Login),
            ["home"] => Some(View::Home),
            ["jobs"] => Some(View::Jobs),
            ["jobs", id] if !id.is_empty() => Some(View::JobDetails(id.to_string())),
            ["applications"] => Some(View::Applications),
            ["profile"] => Some(View::Profile),
            ["admin", "dashboard"] => Some(View::AdminDashboard),
            ["admin", "jobs"] => Some(View::AdminJobs),
            ["admin", "jobs", "create"] => Some(View::AdminCreateJob),
            ["admin", "jobs", "edit", id] if !id.is_empty() => {
                Some(View::AdminEditJob(id.to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Guard bound to the process-wide session store
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decide whether `view` may be entered right now
    pub fn check(&self, view: &View) -> GuardDecision {
        let status = self.session.current();
        let decision = can_enter(&status, view.access());

        match decision {
            GuardDecision::Allow => debug!("Entering {} as {}", view, status.role),
            GuardDecision::RedirectTo(target) => {
                info!("Redirecting {} from {} to {}", status.role, view, target)
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn status(authenticated: bool, role: Role) -> SessionStatus {
        SessionStatus {
            authenticated,
            role,
        }
    }

    #[test]
    fn test_admin_dashboard_scenarios() {
        let dashboard = View::from_path("/admin/dashboard").unwrap();
        assert_eq!(dashboard, View::AdminDashboard);

        assert_eq!(
            can_enter(&SessionStatus::guest(), dashboard.access()),
            GuardDecision::RedirectTo("/")
        );
        assert_eq!(
            can_enter(&status(true, Role::User), dashboard.access()),
            GuardDecision::RedirectTo("/home")
        );
        assert_eq!(
            can_enter(&status(true, Role::Admin), dashboard.access()),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_authenticated_views() {
        for view in [View::Home, View::Jobs, View::Applications, View::Profile] {
            assert_eq!(
                can_enter(&SessionStatus::guest(), view.access()),
                GuardDecision::RedirectTo("/")
            );
            assert_eq!(
                can_enter(&status(true, Role::User), view.access()),
                GuardDecision::Allow
            );
            // Admins are not kept out of user pages
            assert_eq!(
                can_enter(&status(true, Role::Admin), view.access()),
                GuardDecision::Allow
            );
        }
    }

    #[test]
    fn test_sign_in_pages_bounce_signed_in_visitors() {
        assert_eq!(
            can_enter(&SessionStatus::guest(), View::SignIn.access()),
            GuardDecision::Allow
        );
        assert_eq!(
            can_enter(&status(true, Role::User), View::Login(AccountKind::Admin).access()),
            GuardDecision::RedirectTo("/home")
        );
    }

    #[test]
    fn test_path_round_trip() {
        let views = [
            View::SignIn,
            View::Login(AccountKind::User),
            View::Home,
            View::Jobs,
            View::JobDetails("65ab".to_string()),
            View::Applications,
            View::Profile,
            View::AdminDashboard,
            View::AdminJobs,
            View::AdminCreateJob,
            View::AdminEditJob("65cd".to_string()),
        ];
        for view in views {
            assert_eq!(View::from_path(&view.path()), Some(view.clone()));
        }
        assert_eq!(View::from_path("/nowhere"), None);
        assert_eq!(View::from_path("/login/guest"), None);
    }

    #[test]
    fn test_guard_follows_session() {
        let session = Arc::new(SessionStore::in_memory(Duration::days(30)));
        let guard = RouteGuard::new(session.clone());

        assert_eq!(guard.check(&View::AdminJobs), GuardDecision::RedirectTo("/"));

        session.sign_in("t", AccountKind::User);
        assert_eq!(guard.check(&View::AdminJobs), GuardDecision::RedirectTo("/home"));
        assert_eq!(guard.check(&View::Jobs), GuardDecision::Allow);

        session.sign_in("t", AccountKind::Admin);
        assert_eq!(guard.check(&View::AdminJobs), GuardDecision::Allow);

        session.sign_out();
        assert_eq!(guard.check(&View::Jobs), GuardDecision::RedirectTo("/"));
    }

    #[test]
    fn test_expired_session_treated_as_absent() {
        // A zero TTL expires the session the moment it is written
        let session = Arc::new(SessionStore::in_memory(Duration::zero()));
        session.sign_in("t", AccountKind::Admin);

        let guard = RouteGuard::new(session);
        assert_eq!(guard.check(&View::AdminDashboard), GuardDecision::RedirectTo("/"));
    }
}
