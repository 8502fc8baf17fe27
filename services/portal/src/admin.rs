//! Admin job management: the posting list, the dashboard and the job form
//!
//! Role checks happen in the route guard when a view is opened. Nothing here
//! re-checks them.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use auth::View;
use common::validation::{ValidationErrors, require};
use tracing::{debug, info, warn};

use crate::gateway::Gateway;
use crate::inflight::InFlight;
use crate::models::{EmploymentType, JobFields, JobPosting};
use crate::state::AppState;
use crate::view::{Confirm, Entry, Notice, Phase, RemoveOutcome, ViewEpoch};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this job?";

/// How many postings the dashboard lists
pub const RECENT_JOBS: usize = 5;

/// Raw job form input, exactly as typed
#[derive(Debug, Clone, PartialEq)]
pub struct JobForm {
    pub title: String,
    pub rating: String,
    pub company_logo_url: String,
    pub location: String,
    pub employment_type: String,
    pub package_per_annum: String,
    pub job_description: String,
}

impl JobForm {
    /// Empty form for a new posting
    pub fn blank() -> Self {
        Self {
            title: String::new(),
            rating: String::new(),
            company_logo_url: String::new(),
            location: String::new(),
            employment_type: EmploymentType::FullTime.label().to_string(),
            package_per_annum: String::new(),
            job_description: String::new(),
        }
    }

    /// Form prefilled from an existing posting
    pub fn from_posting(job: &JobPosting) -> Self {
        Self {
            title: job.title.clone(),
            rating: job.rating.to_string(),
            company_logo_url: job.company_logo_url.clone().unwrap_or_default(),
            location: job.location.clone(),
            employment_type: job.employment_type.label().to_string(),
            package_per_annum: job.package_per_annum.clone(),
            job_description: job.job_description.clone(),
        }
    }

    /// Check every field and build the request body
    ///
    /// All problems are reported at once. The logo is the only optional field.
    pub fn validate(&self) -> Result<JobFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("title", require("Title", &self.title));
        let rating = parse_rating(&self.rating);
        if let Err(message) = &rating {
            errors.add("rating", message.clone());
        }
        errors.check("location", require("Location", &self.location));
        let employment_type = self.employment_type.parse::<EmploymentType>();
        if let Err(message) = &employment_type {
            errors.add("employmentType", message.clone());
        }
        errors.check(
            "packagePerAnnum",
            require("Package per annum", &self.package_per_annum),
        );
        errors.check(
            "jobDescription",
            require("Job description", &self.job_description),
        );

        let (Ok(rating), Ok(employment_type)) = (rating, employment_type) else {
            return Err(errors);
        };

        let logo = self.company_logo_url.trim();
        errors.into_result(JobFields {
            title: self.title.trim().to_string(),
            rating,
            company_logo_url: (!logo.is_empty()).then(|| logo.to_string()),
            location: self.location.trim().to_string(),
            employment_type,
            package_per_annum: self.package_per_annum.trim().to_string(),
            job_description: self.job_description.trim().to_string(),
        })
    }
}

impl Default for JobForm {
    fn default() -> Self {
        Self::blank()
    }
}

fn parse_rating(input: &str) -> Result<f64, String> {
    require("Rating", input)?;
    let rating: f64 = input
        .trim()
        .parse()
        .map_err(|_| "Rating must be a number".to_string())?;
    if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
        return Err("Rating must be between 0 and 5".to_string());
    }
    Ok(rating)
}

/// Navigation scheduled after a confirmation has been shown
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub to: View,
    pub after: Duration,
}

impl Redirect {
    /// Wait out the confirmation delay, then hand back the target
    pub async fn follow(self) -> View {
        tokio::time::sleep(self.after).await;
        self.to
    }
}

/// Outcome of submitting the job form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved { message: String, redirect: Redirect },
    /// Rejected client-side, no request was made
    Invalid(ValidationErrors),
    Busy,
    Failed(String),
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditorMode {
    Create,
    Edit(String),
}

#[derive(Debug)]
struct EditorState {
    phase: Phase,
    form: JobForm,
    errors: ValidationErrors,
    notice: Option<Notice>,
}

/// Create and edit forms for a single posting
pub struct JobEditor {
    gateway: Gateway,
    mode: EditorMode,
    redirect_delay: Duration,
    epoch: ViewEpoch,
    submitting: InFlight,
    state: Mutex<EditorState>,
}

impl JobEditor {
    pub fn open_create(app: &AppState) -> Entry<Self> {
        app.enter(&View::AdminCreateJob, || {
            Self::build(app, EditorMode::Create, Phase::Ready)
        })
    }

    /// The edit form starts loading; call [`JobEditor::load`] to prefill it
    pub fn open_edit(app: &AppState, job_id: impl Into<String>) -> Entry<Self> {
        let job_id = job_id.into();
        app.enter(&View::AdminEditJob(job_id.clone()), || {
            Self::build(app, EditorMode::Edit(job_id), Phase::Loading)
        })
    }

    fn build(app: &AppState, mode: EditorMode, phase: Phase) -> Self {
        Self {
            gateway: app.gateway.clone(),
            mode,
            redirect_delay: app.config.redirect_delay(),
            epoch: ViewEpoch::new(),
            submitting: InFlight::new(),
            state: Mutex::new(EditorState {
                phase,
                form: JobForm::blank(),
                errors: ValidationErrors::new(),
                notice: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prefill the edit form from the server; a create form is ready as is
    pub async fn load(&self) -> Phase {
        let EditorMode::Edit(job_id) = &self.mode else {
            return self.phase();
        };

        let ticket = self.epoch.begin_load();
        self.state().phase = Phase::Loading;

        let result = self.gateway.admin_get_job(job_id).await;
        if !self.epoch.is_current(ticket) {
            return self.phase();
        }

        let mut state = self.state();
        match result {
            Ok(job) => {
                state.form = JobForm::from_posting(&job);
                state.phase = Phase::Ready;
            }
            Err(e) => {
                warn!("Could not prefill job {}: {}", job_id, e);
                state.phase = Phase::Failed(e.user_message("Failed to load job details"));
            }
        }
        state.phase.clone()
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, EditorMode::Edit(_))
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    pub fn form(&self) -> JobForm {
        self.state().form.clone()
    }

    /// Replace the form contents; clears earlier feedback
    pub fn set_form(&self, form: JobForm) {
        let mut state = self.state();
        state.form = form;
        state.errors = ValidationErrors::new();
        state.notice = None;
    }

    pub fn errors(&self) -> ValidationErrors {
        self.state().errors.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy("form")
    }

    /// Validate, then create or update the posting
    pub async fn submit(&self) -> SubmitOutcome {
        let fields = match self.form().validate() {
            Ok(fields) => fields,
            Err(errors) => {
                debug!("Job form rejected: {}", errors);
                self.state().errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
        };

        let Some(_guard) = self.submitting.try_begin("form") else {
            return SubmitOutcome::Busy;
        };

        let ticket = self.epoch.mutation();
        let (result, success, fallback) = match &self.mode {
            EditorMode::Create => (
                self.gateway.admin_create_job(&fields).await,
                "Job created successfully! Redirecting...",
                "Failed to create job",
            ),
            EditorMode::Edit(job_id) => (
                self.gateway.admin_update_job(job_id, &fields).await,
                "Job updated successfully! Redirecting...",
                "Failed to update job",
            ),
        };
        if !self.epoch.is_current(ticket) {
            return SubmitOutcome::Discarded;
        }

        let mut state = self.state();
        state.errors = ValidationErrors::new();
        match result {
            Ok(()) => {
                info!("Saved job \"{}\"", fields.title);
                state.notice = Some(Notice::Success(success.to_string()));
                SubmitOutcome::Saved {
                    message: success.to_string(),
                    redirect: Redirect {
                        to: View::AdminJobs,
                        after: self.redirect_delay,
                    },
                }
            }
            Err(e) => {
                let message = e.user_message(fallback);
                state.notice = Some(Notice::Error(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub fn leave(&self) {
        self.epoch.leave();
    }
}

/// Headline numbers of the admin dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub recent_jobs: Vec<JobPosting>,
}

#[derive(Debug)]
struct AdminJobsState {
    phase: Phase,
    jobs: Vec<JobPosting>,
    /// Confirmed deletions, kept out of any list fetched concurrently
    deleted: HashSet<String>,
    notice: Option<Notice>,
}

/// The admin's own postings, shown as a list or as the dashboard
pub struct AdminJobsView {
    gateway: Gateway,
    epoch: ViewEpoch,
    deleting: InFlight,
    state: Mutex<AdminJobsState>,
}

impl AdminJobsView {
    /// `/admin/jobs`
    pub fn open(app: &AppState) -> Entry<Self> {
        app.enter(&View::AdminJobs, || Self::build(app))
    }

    /// `/admin/dashboard`
    pub fn open_dashboard(app: &AppState) -> Entry<Self> {
        app.enter(&View::AdminDashboard, || Self::build(app))
    }

    fn build(app: &AppState) -> Self {
        Self {
            gateway: app.gateway.clone(),
            epoch: ViewEpoch::new(),
            deleting: InFlight::new(),
            state: Mutex::new(AdminJobsState {
                phase: Phase::Loading,
                jobs: Vec::new(),
                deleted: HashSet::new(),
                notice: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, AdminJobsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn load(&self) -> Phase {
        let ticket = self.epoch.begin_load();
        self.state().phase = Phase::Loading;

        let result = self.gateway.admin_list_jobs().await;
        if !self.epoch.is_current(ticket) {
            return self.phase();
        }

        let mut state = self.state();
        match result {
            Ok(jobs) => {
                debug!("Admin holds {} postings", jobs.len());
                let kept: Vec<JobPosting> = jobs
                    .into_iter()
                    .filter(|j| !state.deleted.contains(&j.id))
                    .collect();
                state.jobs = kept;
                state.phase = Phase::Ready;
            }
            Err(e) => {
                state.jobs.clear();
                state.phase = Phase::Failed(e.user_message("Failed to fetch jobs"));
            }
        }
        state.phase.clone()
    }

    /// Delete a posting after confirmation, then drop it from the held list
    pub async fn delete(&self, job_id: &str, confirm: &dyn Confirm) -> RemoveOutcome {
        if !self.state().jobs.iter().any(|j| j.id == job_id) {
            return RemoveOutcome::NotFound;
        }

        let Some(_guard) = self.deleting.try_begin(job_id) else {
            return RemoveOutcome::Busy;
        };

        if !confirm.confirm(DELETE_PROMPT) {
            return RemoveOutcome::Cancelled;
        }

        let ticket = self.epoch.mutation();
        let result = self.gateway.admin_delete_job(job_id).await;
        if !self.epoch.is_current(ticket) {
            return RemoveOutcome::Discarded;
        }

        let mut state = self.state();
        match result {
            Ok(()) => {
                if let Some(index) = state.jobs.iter().position(|j| j.id == job_id) {
                    state.jobs.remove(index);
                }
                state.deleted.insert(job_id.to_string());
                info!("Deleted job {}", job_id);
                state.notice = Some(Notice::Success("Job deleted successfully".to_string()));
                RemoveOutcome::Removed
            }
            Err(e) => {
                warn!("Delete of job {} failed: {}", job_id, e);
                let message = e.user_message("Failed to delete job");
                state.notice = Some(Notice::Error(message.clone()));
                RemoveOutcome::Failed(message)
            }
        }
    }

    pub fn leave(&self) {
        self.epoch.leave();
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    pub fn jobs(&self) -> Vec<JobPosting> {
        self.state().jobs.clone()
    }

    pub fn is_deleting(&self, job_id: &str) -> bool {
        self.deleting.is_busy(job_id)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }

    pub fn stats(&self) -> DashboardStats {
        let state = self.state();
        DashboardStats {
            total_jobs: state.jobs.len(),
            recent_jobs: state.jobs.iter().take(RECENT_JOBS).cloned().collect(),
        }
    }
}
