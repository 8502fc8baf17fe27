//! Job catalog: loading postings and filtering them locally
//!
//! Filtering is a pure function over the last loaded collection. Changing
//! criteria never touches the network; only [`CatalogView::load`] does.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use auth::View;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::gateway::Gateway;
use crate::models::{EmploymentType, JobPosting, Profile};
use crate::state::AppState;
use crate::view::{Entry, Phase, ViewEpoch};

/// User-chosen filters, recomputed on every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Empty means every type passes
    pub employment_types: BTreeSet<EmploymentType>,
    /// Lower bound in LPA (lakhs per annum)
    pub min_salary_lpa: Option<u64>,
    /// Case-insensitive substring of the title
    pub search_text: String,
}

impl FilterCriteria {
    pub fn toggle_employment_type(&mut self, employment_type: EmploymentType) {
        if !self.employment_types.remove(&employment_type) {
            self.employment_types.insert(employment_type);
        }
    }
}

/// Leading salary figure of a package text such as `"10 - 15 LPA"`
///
/// The first run of ASCII digits wins; text without them counts as 0.
pub fn parse_salary_lpa(package_per_annum: &str) -> u64 {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits =
        DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("Failed to compile digit regex"));

    digits
        .find(package_per_annum)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Whether one posting passes every predicate
pub fn matches(job: &JobPosting, criteria: &FilterCriteria) -> bool {
    let type_ok = criteria.employment_types.is_empty()
        || criteria.employment_types.contains(&job.employment_type);

    let salary_ok = match criteria.min_salary_lpa {
        None => true,
        Some(min) => parse_salary_lpa(&job.package_per_annum) >= min,
    };

    let text_ok = job
        .title
        .to_lowercase()
        .contains(&criteria.search_text.to_lowercase());

    type_ok && salary_ok && text_ok
}

/// Visible subset of `jobs`, in their original order
pub fn apply_filter<'a>(jobs: &'a [JobPosting], criteria: &FilterCriteria) -> Vec<&'a JobPosting> {
    jobs.iter().filter(|job| matches(job, criteria)).collect()
}

#[derive(Debug)]
struct CatalogState {
    phase: Phase,
    profile: Option<Profile>,
    profile_error: Option<String>,
    jobs: Vec<JobPosting>,
    criteria: FilterCriteria,
}

/// The job search page: profile card, filters, and the filtered list
pub struct CatalogView {
    gateway: Gateway,
    epoch: ViewEpoch,
    state: Mutex<CatalogState>,
}

impl CatalogView {
    pub fn open(app: &AppState) -> Entry<Self> {
        app.enter(&View::Jobs, || Self {
            gateway: app.gateway.clone(),
            epoch: ViewEpoch::new(),
            state: Mutex::new(CatalogState {
                phase: Phase::Loading,
                profile: None,
                profile_error: None,
                jobs: Vec::new(),
                criteria: FilterCriteria::default(),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch profile and postings together and replace everything held locally
    pub async fn load(&self) -> Phase {
        let ticket = self.epoch.begin_load();
        self.state().phase = Phase::Loading;

        let (profile, jobs) = tokio::join!(self.gateway.get_profile(), self.gateway.list_jobs());

        if !self.epoch.is_current(ticket) {
            debug!("Catalog load superseded, dropping result");
            return self.phase();
        }

        let mut state = self.state();
        match profile {
            Ok(profile) => {
                state.profile = Some(profile);
                state.profile_error = None;
            }
            Err(e) => {
                warn!("Profile for catalog unavailable: {}", e);
                state.profile = None;
                state.profile_error = Some(e.user_message("Failed to fetch profile"));
            }
        }

        match jobs {
            Ok(jobs) => {
                info!("Catalog loaded {} postings", jobs.len());
                state.jobs = jobs;
                state.phase = Phase::Ready;
            }
            Err(e) => {
                state.jobs.clear();
                state.phase = Phase::Failed(e.user_message("Failed to fetch jobs"));
            }
        }

        state.phase.clone()
    }

    /// Drop any answer still on its way
    pub fn leave(&self) {
        self.epoch.leave();
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    pub fn profile_error(&self) -> Option<String> {
        self.state().profile_error.clone()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.state().criteria.clone()
    }

    pub fn set_criteria(&self, criteria: FilterCriteria) {
        self.state().criteria = criteria;
    }

    pub fn toggle_employment_type(&self, employment_type: EmploymentType) {
        self.state().criteria.toggle_employment_type(employment_type);
    }

    pub fn set_min_salary(&self, min_salary_lpa: Option<u64>) {
        self.state().criteria.min_salary_lpa = min_salary_lpa;
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.state().criteria.search_text = text.into();
    }

    /// Total postings loaded, before filtering
    pub fn job_count(&self) -> usize {
        self.state().jobs.len()
    }

    /// Postings passing the current criteria
    pub fn visible(&self) -> Vec<JobPosting> {
        let state = self.state();
        apply_filter(&state.jobs, &state.criteria)
            .into_iter()
            .cloned()
            .collect()
    }
}
