//! Onboarding state machine — tracks which phase the user is in.

use serde::{Deserialize, Serialize};

use super::form::FieldErrors;

/// The phases of onboarding.
///
/// Progresses linearly: Welcome → Occupation → EmploymentIncome → Identity →
/// Household → Preferences → Complete. Identity, Household and Preferences
/// make up the profile-details section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    #[default]
    Welcome,
    Occupation,
    EmploymentIncome,
    Identity,
    Household,
    Preferences,
    Complete,
}

impl OnboardingPhase {
    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Only single steps are allowed, forward or back.
    pub fn can_transition_to(&self, target: OnboardingPhase) -> bool {
        self.next() == Some(target) || self.previous() == Some(target)
    }

    /// Whether this phase is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether this phase is one of the profile-details sub-steps.
    pub fn is_profile_details(&self) -> bool {
        matches!(self, Self::Identity | Self::Household | Self::Preferences)
    }

    /// Get the next phase in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingPhase> {
        use OnboardingPhase::*;
        match self {
            Welcome => Some(Occupation),
            Occupation => Some(EmploymentIncome),
            EmploymentIncome => Some(Identity),
            Identity => Some(Household),
            Household => Some(Preferences),
            Preferences => Some(Complete),
            Complete => None,
        }
    }

    /// Get the previous phase, if any.
    pub fn previous(&self) -> Option<OnboardingPhase> {
        use OnboardingPhase::*;
        match self {
            Welcome => None,
            Occupation => Some(Welcome),
            EmploymentIncome => Some(Occupation),
            Identity => Some(EmploymentIncome),
            Household => Some(Identity),
            Preferences => Some(Household),
            Complete => Some(Preferences),
        }
    }
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Occupation => "occupation",
            Self::EmploymentIncome => "employment_income",
            Self::Identity => "identity",
            Self::Household => "household",
            Self::Preferences => "preferences",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// In-flight onboarding state: the current phase and the errors from the
/// last forward attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingState {
    pub phase: OnboardingPhase,
    pub errors: FieldErrors,
}

impl OnboardingState {
    /// Start at a given phase with no errors.
    pub fn at(phase: OnboardingPhase) -> Self {
        Self {
            phase,
            errors: FieldErrors::new(),
        }
    }

    /// Advance to the next phase. Returns an error if already at terminal phase.
    pub fn advance(&mut self) -> Result<OnboardingPhase, String> {
        let next = self
            .phase
            .next()
            .ok_or_else(|| "Already at terminal phase".to_string())?;
        if !self.phase.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.phase, next));
        }
        self.phase = next;
        self.errors = FieldErrors::new();
        Ok(next)
    }

    /// Step back one phase and clear errors. Stays put at the initial phase.
    pub fn retreat(&mut self) -> OnboardingPhase {
        if let Some(previous) = self.phase.previous() {
            self.phase = previous;
        }
        self.errors = FieldErrors::new();
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [OnboardingPhase; 7] = [
        OnboardingPhase::Welcome,
        OnboardingPhase::Occupation,
        OnboardingPhase::EmploymentIncome,
        OnboardingPhase::Identity,
        OnboardingPhase::Household,
        OnboardingPhase::Preferences,
        OnboardingPhase::Complete,
    ];

    #[test]
    fn valid_transitions() {
        for pair in ORDER.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
            assert!(to.can_transition_to(from), "{to} should step back to {from}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use OnboardingPhase::*;
        // Skip phases
        assert!(!Welcome.can_transition_to(EmploymentIncome));
        assert!(!Occupation.can_transition_to(Identity));
        assert!(!Identity.can_transition_to(Complete));
        // Terminal does not wrap around
        assert!(!Complete.can_transition_to(Welcome));
        // Self-transition
        assert!(!Identity.can_transition_to(Identity));
    }

    #[test]
    fn is_terminal() {
        use OnboardingPhase::*;
        assert!(Complete.is_terminal());
        assert!(!Welcome.is_terminal());
        assert!(!Preferences.is_terminal());
    }

    #[test]
    fn profile_details_grouping() {
        use OnboardingPhase::*;
        let details: Vec<_> = ORDER.into_iter().filter(|p| p.is_profile_details()).collect();
        assert_eq!(details, vec![Identity, Household, Preferences]);
    }

    #[test]
    fn next_and_previous_walk_all_phases() {
        let mut current = OnboardingPhase::Welcome;
        for expected in &ORDER[1..] {
            current = current.next().unwrap();
            assert_eq!(current, *expected);
        }
        assert!(current.next().is_none());

        for expected in ORDER[..ORDER.len() - 1].iter().rev() {
            current = current.previous().unwrap();
            assert_eq!(current, *expected);
        }
        assert!(current.previous().is_none());
    }

    #[test]
    fn display_matches_serde() {
        for phase in ORDER {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{phase}\""), json, "Display and serde should match for {phase:?}");
        }
    }

    #[test]
    fn state_advance_clears_errors_and_stops_at_terminal() {
        let mut state = OnboardingState::default();
        for expected in &ORDER[1..] {
            state.errors.insert("field", "message");
            assert_eq!(state.advance().unwrap(), *expected);
            assert!(state.errors.is_empty(), "Errors should reset on advance");
        }
        assert!(state.advance().is_err());
    }

    #[test]
    fn retreat_clears_errors_and_floors_at_welcome() {
        let mut state = OnboardingState::at(OnboardingPhase::Occupation);
        state.errors.insert("occupation", "Select your occupation");

        assert_eq!(state.retreat(), OnboardingPhase::Welcome);
        assert!(state.errors.is_empty());

        state.errors.insert("x", "y");
        assert_eq!(state.retreat(), OnboardingPhase::Welcome);
        assert!(state.errors.is_empty());
    }
}
