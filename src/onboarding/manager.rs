//! ProfileBuilder — drives the onboarding phases against the app store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::form::{FieldErrors, OnboardingForm};
use super::state::{OnboardingPhase, OnboardingState};
use crate::error::StoreError;
use crate::store::{AppState, AppStore, CurrentStep};

/// Result of a forward transition attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvanceOutcome {
    pub ok: bool,
    pub errors: FieldErrors,
    /// Phase after the attempt (unchanged when `ok` is false).
    pub phase: OnboardingPhase,
}

/// Result of finishing onboarding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishOutcome {
    pub ok: bool,
    pub errors: FieldErrors,
    /// The state that was persisted, when `ok`.
    pub state: Option<AppState>,
}

/// Coordinates the onboarding flow: phase tracking, validation, and
/// writing the provisional and final profile.
pub struct ProfileBuilder {
    store: Arc<AppStore>,
    state: OnboardingState,
    form: OnboardingForm,
}

impl ProfileBuilder {
    /// Begin at Welcome. Fields are hydrated from any stored profile.
    pub fn start(store: Arc<AppStore>) -> Self {
        let form = store
            .get_state()
            .user
            .as_ref()
            .map(OnboardingForm::from_profile)
            .unwrap_or_default();
        Self {
            store,
            state: OnboardingState::default(),
            form,
        }
    }

    /// Re-enter the flow to edit an existing profile.
    ///
    /// With a stored profile this starts at Identity with every field
    /// hydrated from it; otherwise it is the same as [`ProfileBuilder::start`].
    pub fn resume(store: Arc<AppStore>) -> Self {
        let Some(profile) = store.get_state().user else {
            return Self::start(store);
        };
        debug!(profile_id = %profile.id, "Resuming onboarding for profile edit");
        Self {
            form: OnboardingForm::from_profile(&profile),
            state: OnboardingState::at(OnboardingPhase::Identity),
            store,
        }
    }

    pub fn phase(&self) -> OnboardingPhase {
        self.state.phase
    }

    /// Errors from the last forward attempt.
    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    /// The captured form data, for pre-filling inputs.
    pub fn form(&self) -> &OnboardingForm {
        &self.form
    }

    /// Try to move forward from the current phase.
    ///
    /// The current phase's guard runs against `form`. Advancing from
    /// Preferences finishes onboarding.
    pub fn attempt_advance(&mut self, form: OnboardingForm) -> AdvanceOutcome {
        self.form = form;
        let phase = self.state.phase;

        if phase == OnboardingPhase::Preferences {
            let outcome = self.finish(self.form.clone());
            return AdvanceOutcome {
                ok: outcome.ok,
                errors: outcome.errors,
                phase: self.state.phase,
            };
        }

        if phase.is_terminal() {
            let mut errors = FieldErrors::new();
            errors.insert("step", "Onboarding is already complete");
            return self.reject(errors);
        }

        let errors = self.form.validate_phase(phase);
        if !errors.is_empty() {
            debug!(phase = %phase, fields = errors.len(), "Onboarding step blocked by validation");
            return self.reject(errors);
        }

        if phase == OnboardingPhase::EmploymentIncome {
            if let Err(errors) = self.store_provisional_profile() {
                return self.reject(errors);
            }
        }

        match self.state.advance() {
            Ok(next) => {
                debug!(from = %phase, to = %next, "Onboarding advanced");
                AdvanceOutcome {
                    ok: true,
                    errors: FieldErrors::new(),
                    phase: next,
                }
            }
            Err(e) => {
                warn!("Failed to advance onboarding phase: {}", e);
                let mut errors = FieldErrors::new();
                errors.insert("step", e);
                self.reject(errors)
            }
        }
    }

    /// Step back one phase. Always allowed; clears errors.
    pub fn attempt_back(&mut self) -> OnboardingPhase {
        let from = self.state.phase;
        let to = self.state.retreat();
        debug!(from = %from, to = %to, "Onboarding stepped back");
        to
    }

    /// Validate and persist the final profile, marking onboarding complete.
    ///
    /// Identity is re-checked here regardless of the current phase, so a
    /// direct submission cannot skip it.
    pub fn finish(&mut self, form: OnboardingForm) -> FinishOutcome {
        self.form = form;
        let current = self.store.get_state();

        let profile = match self.form.build_profile(current.user.as_ref()) {
            Ok(profile) => profile,
            Err(errors) => {
                debug!(fields = errors.len(), "Onboarding finish blocked by validation");
                self.state.errors = errors.clone();
                return FinishOutcome {
                    ok: false,
                    errors,
                    state: None,
                };
            }
        };

        let next = AppState {
            user: Some(profile),
            onboarding_complete: true,
            current_step: Some(CurrentStep::Completed),
            ..current
        };

        if let Err(e) = self.store.set_state(next.clone()) {
            let errors = store_failure(&e);
            self.state.errors = errors.clone();
            return FinishOutcome {
                ok: false,
                errors,
                state: None,
            };
        }

        self.state = OnboardingState::at(OnboardingPhase::Complete);
        if let Some(user) = next.user.as_ref() {
            info!(profile_id = %user.id, "Onboarding complete");
        }
        FinishOutcome {
            ok: true,
            errors: FieldErrors::new(),
            state: Some(next),
        }
    }

    /// Write the provisional profile and clear the completion flag.
    fn store_provisional_profile(&self) -> Result<(), FieldErrors> {
        let profile = self.form.provisional_profile()?;
        let profile_id = profile.id;
        self.store
            .update(|state| {
                state.user = Some(profile);
                state.onboarding_complete = false;
                state.current_step = Some(CurrentStep::Occupation);
            })
            .map_err(|e| store_failure(&e))?;
        info!(profile_id = %profile_id, "Provisional profile created");
        Ok(())
    }

    fn reject(&mut self, errors: FieldErrors) -> AdvanceOutcome {
        self.state.errors = errors.clone();
        AdvanceOutcome {
            ok: false,
            errors,
            phase: self.state.phase,
        }
    }
}

fn store_failure(e: &StoreError) -> FieldErrors {
    warn!("Failed to persist onboarding progress: {}", e);
    let mut errors = FieldErrors::new();
    errors.insert("store", format!("Could not save your progress: {e}"));
    errors
}
