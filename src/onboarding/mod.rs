//! Onboarding system — the guided flow that builds a `UserProfile`.
//!
//! The flow walks through fixed phases, each gated on the data it needs.
//! After the employment step a provisional profile is stored; finishing the
//! profile-details steps completes it and marks onboarding done.

pub mod form;
pub mod manager;
pub mod model;
pub mod state;

pub use form::{FieldErrors, OnboardingForm};
pub use manager::{AdvanceOutcome, FinishOutcome, ProfileBuilder};
pub use model::{EmploymentType, FinancialYearEnd, UserProfile};
pub use state::{OnboardingPhase, OnboardingState};
