//! Applying to postings and managing one's own applications

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use auth::View;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;
use crate::inflight::InFlight;
use crate::models::{Application, JobPosting};
use crate::state::AppState;
use crate::view::{Confirm, Entry, Notice, Phase, RemoveOutcome, ViewEpoch};

pub const WITHDRAW_PROMPT: &str = "Are you sure you want to withdraw this application?";

/// Outcome of one apply trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Known applied already, nothing new was created
    AlreadyApplied,
    /// An apply for this job is still outstanding
    InFlight,
    Failed(String),
    Discarded,
}

#[derive(Debug)]
struct DetailsState {
    phase: Phase,
    job: Option<JobPosting>,
    has_applied: bool,
    /// Set once this view saw the server accept or report an application
    applied_here: bool,
    notice: Option<Notice>,
}

/// `/jobs/:id`: one posting plus the apply trigger
pub struct JobDetailsView {
    gateway: Gateway,
    job_id: String,
    epoch: ViewEpoch,
    in_flight: InFlight,
    state: Mutex<DetailsState>,
}

impl JobDetailsView {
    pub fn open(app: &AppState, job_id: impl Into<String>) -> Entry<Self> {
        let job_id = job_id.into();
        app.enter(&View::JobDetails(job_id.clone()), || Self {
            gateway: app.gateway.clone(),
            job_id,
            epoch: ViewEpoch::new(),
            in_flight: InFlight::new(),
            state: Mutex::new(DetailsState {
                phase: Phase::Loading,
                job: None,
                has_applied: false,
                applied_here: false,
                notice: None,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, DetailsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the posting together with whether the caller already applied
    pub async fn load(&self) -> Phase {
        let ticket = self.epoch.begin_load();
        self.state().phase = Phase::Loading;

        let result = self.gateway.job_details(&self.job_id).await;
        if !self.epoch.is_current(ticket) {
            return self.phase();
        }

        let mut state = self.state();
        match result {
            Ok(details) => {
                state.job = Some(details.job);
                state.has_applied = details.has_applied || state.applied_here;
                state.phase = Phase::Ready;
            }
            Err(e) => {
                state.job = None;
                let fallback = if e.status() == Some(404) {
                    "Job not found"
                } else {
                    "Failed to fetch job details"
                };
                state.phase = Phase::Failed(e.user_message(fallback));
            }
        }
        state.phase.clone()
    }

    /// Submit an application for this posting
    ///
    /// A second trigger while the first is outstanding is refused, and a job
    /// already marked applied is never posted again.
    pub async fn apply(&self) -> ApplyOutcome {
        if self.has_applied() {
            debug!("Job {} already applied, not posting again", self.job_id);
            return ApplyOutcome::AlreadyApplied;
        }

        let Some(_guard) = self.in_flight.try_begin(&self.job_id) else {
            return ApplyOutcome::InFlight;
        };

        let ticket = self.epoch.mutation();
        let result = self.gateway.apply(&self.job_id).await;
        if !self.epoch.is_current(ticket) {
            debug!("Apply answer for {} arrived after leaving the view", self.job_id);
            return ApplyOutcome::Discarded;
        }

        let mut state = self.state();
        match result {
            Ok(()) => {
                info!("Applied to job {}", self.job_id);
                state.has_applied = true;
                state.applied_here = true;
                state.notice = Some(Notice::Success(
                    "Application submitted successfully!".to_string(),
                ));
                ApplyOutcome::Applied
            }
            Err(e) if e.status() == Some(409) => {
                state.has_applied = true;
                state.applied_here = true;
                state.notice = Some(Notice::Error(
                    e.user_message("You have already applied for this job"),
                ));
                ApplyOutcome::AlreadyApplied
            }
            Err(e) => {
                warn!("Apply to {} failed: {}", self.job_id, e);
                let message = e.user_message("Failed to apply for job");
                state.notice = Some(Notice::Error(message.clone()));
                ApplyOutcome::Failed(message)
            }
        }
    }

    pub fn leave(&self) {
        self.epoch.leave();
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    pub fn job(&self) -> Option<JobPosting> {
        self.state().job.clone()
    }

    pub fn has_applied(&self) -> bool {
        self.state().has_applied
    }

    pub fn is_applying(&self) -> bool {
        self.in_flight.is_busy(&self.job_id)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }
}

#[derive(Debug)]
struct ApplicationsState {
    phase: Phase,
    applications: Vec<Application>,
    /// Confirmed withdrawals, kept out of any list fetched concurrently
    withdrawn: HashSet<String>,
    notice: Option<Notice>,
}

/// `/applications`: the caller's own applications
pub struct ApplicationsView {
    gateway: Gateway,
    epoch: ViewEpoch,
    withdrawing: InFlight,
    state: Mutex<ApplicationsState>,
}

impl ApplicationsView {
    pub fn open(app: &AppState) -> Entry<Self> {
        app.enter(&View::Applications, || Self {
            gateway: app.gateway.clone(),
            epoch: ViewEpoch::new(),
            withdrawing: InFlight::new(),
            state: Mutex::new(ApplicationsState {
                phase: Phase::Loading,
                applications: Vec::new(),
                withdrawn: HashSet::new(),
                notice: None,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, ApplicationsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the held list with a fresh fetch
    pub async fn load(&self) -> Phase {
        let ticket = self.epoch.begin_load();
        self.state().phase = Phase::Loading;

        let result = self.gateway.list_applications().await;
        if !self.epoch.is_current(ticket) {
            return self.phase();
        }

        let mut state = self.state();
        match result {
            Ok(applications) => {
                debug!("Loaded {} applications", applications.len());
                let kept: Vec<Application> = applications
                    .into_iter()
                    .filter(|a| !state.withdrawn.contains(&a.id))
                    .collect();
                state.applications = kept;
                state.phase = Phase::Ready;
            }
            Err(e) => {
                state.applications.clear();
                state.phase = Phase::Failed(e.user_message("Failed to fetch applications"));
            }
        }
        state.phase.clone()
    }

    /// Withdraw one application after confirmation
    ///
    /// Only that entry is busy while the request is outstanding. It leaves the
    /// list only once the server confirms.
    pub async fn withdraw(&self, application_id: &str, confirm: &dyn Confirm) -> RemoveOutcome {
        if !self.contains(application_id) {
            return RemoveOutcome::NotFound;
        }

        let Some(_guard) = self.withdrawing.try_begin(application_id) else {
            return RemoveOutcome::Busy;
        };

        if !confirm.confirm(WITHDRAW_PROMPT) {
            return RemoveOutcome::Cancelled;
        }

        let ticket = self.epoch.mutation();
        let result = self.gateway.withdraw_application(application_id).await;
        if !self.epoch.is_current(ticket) {
            return RemoveOutcome::Discarded;
        }

        let mut state = self.state();
        match result {
            Ok(()) => {
                if let Some(index) = state
                    .applications
                    .iter()
                    .position(|a| a.id == application_id)
                {
                    state.applications.remove(index);
                }
                state.withdrawn.insert(application_id.to_string());
                info!("Withdrew application {}", application_id);
                RemoveOutcome::Removed
            }
            Err(e) => {
                warn!("Withdraw of {} failed: {}", application_id, e);
                let message = e.user_message("Failed to delete application");
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

    pub fn applications(&self) -> Vec<Application> {
        self.state().applications.clone()
    }

    pub fn contains(&self, application_id: &str) -> bool {
        self.state()
            .applications
            .iter()
            .any(|a| a.id == application_id)
    }

    pub fn is_withdrawing(&self, application_id: &str) -> bool {
        self.withdrawing.is_busy(application_id)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }
}
