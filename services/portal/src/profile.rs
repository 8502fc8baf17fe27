//! The signed-in user's profile page

use std::sync::{Mutex, MutexGuard, PoisonError};

use auth::View;
use tracing::{info, warn};

use crate::gateway::Gateway;
use crate::inflight::InFlight;
use crate::models::Profile;
use crate::state::AppState;
use crate::view::{Entry, Notice, Phase, ViewEpoch};

/// Outcome of saving the edited profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// `save` was called without `begin_edit`
    NotEditing,
    Busy,
    Failed(String),
    Discarded,
}

#[derive(Debug)]
struct ProfileState {
    phase: Phase,
    profile: Option<Profile>,
    draft: Option<Profile>,
    notice: Option<Notice>,
}

pub struct ProfileView {
    gateway: Gateway,
    epoch: ViewEpoch,
    saving: InFlight,
    state: Mutex<ProfileState>,
}

impl ProfileView {
    pub fn open(app: &AppState) -> Entry<Self> {
        app.enter(&View::Profile, || Self {
            gateway: app.gateway.clone(),
            epoch: ViewEpoch::new(),
            saving: InFlight::new(),
            state: Mutex::new(ProfileState {
                phase: Phase::Loading,
                profile: None,
                draft: None,
                notice: None,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, ProfileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn load(&self) -> Phase {
        let ticket = self.epoch.begin_load();
        self.state().phase = Phase::Loading;

        let result = self.gateway.get_profile().await;
        if !self.epoch.is_current(ticket) {
            return self.phase();
        }

        let mut state = self.state();
        match result {
            Ok(profile) => {
                state.profile = Some(profile);
                state.phase = Phase::Ready;
            }
            Err(e) => {
                state.profile = None;
                state.phase = Phase::Failed(e.user_message("Failed to fetch profile"));
            }
        }
        state.phase.clone()
    }

    /// Start editing from the values currently shown
    pub fn begin_edit(&self) -> Option<Profile> {
        let mut state = self.state();
        let draft = state.profile.clone()?;
        state.draft = Some(draft.clone());
        Some(draft)
    }

    /// Replace the draft; ignored when not editing
    pub fn edit(&self, draft: Profile) {
        let mut state = self.state();
        if state.draft.is_some() {
            state.draft = Some(draft);
        }
    }

    pub fn cancel_edit(&self) {
        self.state().draft = None;
    }

    pub fn is_editing(&self) -> bool {
        self.state().draft.is_some()
    }

    /// Send the draft and show whatever the server stored
    pub async fn save(&self) -> SaveOutcome {
        let Some(draft) = self.state().draft.clone() else {
            return SaveOutcome::NotEditing;
        };

        let Some(_guard) = self.saving.try_begin("profile") else {
            return SaveOutcome::Busy;
        };

        let ticket = self.epoch.mutation();
        let result = self.gateway.update_profile(&draft).await;
        if !self.epoch.is_current(ticket) {
            return SaveOutcome::Discarded;
        }

        let mut state = self.state();
        match result {
            Ok(profile) => {
                info!("Profile updated");
                state.profile = Some(profile);
                state.draft = None;
                state.notice = Some(Notice::Success("Profile updated successfully!".to_string()));
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!("Profile update failed: {}", e);
                let message = e.user_message("Failed to update profile");
                state.notice = Some(Notice::Error(message.clone()));
                SaveOutcome::Failed(message)
            }
        }
    }

    pub fn leave(&self) {
        self.epoch.leave();
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    pub fn draft(&self) -> Option<Profile> {
        self.state().draft.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }
}
