//! Raw onboarding form input and per-phase validation.
//!
//! Collaborators hand over whatever the user typed. Closed-set fields
//! (`employmentType`, `financialYearEnd`) arrive as strings and are parsed
//! here, so bad values become field errors instead of silent casts.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{EmploymentType, FinancialYearEnd, UserProfile};
use super::state::OnboardingPhase;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Field name → message for every failed check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

/// Everything the onboarding screens collect, as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingForm {
    pub occupation: String,
    pub employment_type: String,
    pub income_range: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    pub employer: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub annual_income: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub tax_withheld: Option<Decimal>,

    pub has_spouse: bool,
    pub number_of_dependents: u32,
    pub has_home_office: bool,
    pub has_work_vehicle: bool,
    pub has_work_travel: bool,

    pub financial_year_end: String,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self {
            occupation: String::new(),
            employment_type: String::new(),
            income_range: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            employer: None,
            annual_income: None,
            tax_withheld: None,
            has_spouse: false,
            number_of_dependents: 0,
            has_home_office: false,
            has_work_vehicle: false,
            has_work_travel: false,
            financial_year_end: FinancialYearEnd::default().as_str().to_string(),
        }
    }
}

impl OnboardingForm {
    /// Hydrate every field from a stored profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            occupation: profile.occupation.clone(),
            employment_type: profile.employment_type.as_str().to_string(),
            income_range: profile.income_range.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            employer: profile.employer.clone(),
            annual_income: profile.annual_income,
            tax_withheld: profile.tax_withheld,
            has_spouse: profile.has_spouse,
            number_of_dependents: profile.number_of_dependents,
            has_home_office: profile.has_home_office,
            has_work_vehicle: profile.has_work_vehicle,
            has_work_travel: profile.has_work_travel,
            financial_year_end: profile.financial_year_end.as_str().to_string(),
        }
    }

    /// Run the guard for `phase`. Empty result means the phase may advance.
    pub fn validate_phase(&self, phase: OnboardingPhase) -> FieldErrors {
        match phase {
            OnboardingPhase::Welcome | OnboardingPhase::Household | OnboardingPhase::Complete => {
                FieldErrors::new()
            }
            OnboardingPhase::Occupation => self.occupation_errors(),
            OnboardingPhase::EmploymentIncome => match self.employment_income() {
                Ok(_) => FieldErrors::new(),
                Err(errors) => errors,
            },
            OnboardingPhase::Identity => self.identity_errors(),
            OnboardingPhase::Preferences => match self.financial_year_end() {
                Ok(_) => FieldErrors::new(),
                Err(errors) => errors,
            },
        }
    }

    /// Build the provisional profile captured after the employment step.
    pub fn provisional_profile(&self) -> Result<UserProfile, FieldErrors> {
        let mut errors = self.occupation_errors();
        let employment = self.employment_income();
        let employment_type = match employment {
            Ok(t) => Some(t),
            Err(e) => {
                errors.merge(e);
                None
            }
        };
        match employment_type {
            Some(employment_type) if errors.is_empty() => Ok(UserProfile::provisional(
                self.occupation.trim(),
                employment_type,
                self.income_range.trim(),
            )),
            _ => Err(errors),
        }
    }

    /// Validate everything a completed profile needs and merge it into a
    /// final `UserProfile`.
    ///
    /// `id` and `created_at` come from `existing` when there is one.
    pub fn build_profile(&self, existing: Option<&UserProfile>) -> Result<UserProfile, FieldErrors> {
        let mut errors = self.identity_errors();
        errors.merge(self.occupation_errors());
        let employment_type = self.employment_income().map_err(|e| errors.merge(e)).ok();
        let financial_year_end = self.financial_year_end().map_err(|e| errors.merge(e)).ok();

        let (Some(employment_type), Some(financial_year_end)) = (employment_type, financial_year_end)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let (id, created_at) = existing
            .map(|p| (p.id, p.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), Utc::now()));
        let phone = self.phone.trim();

        Ok(UserProfile {
            id,
            created_at,
            occupation: self.occupation.trim().to_string(),
            employment_type,
            income_range: self.income_range.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            employer: self
                .employer
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            annual_income: self.annual_income,
            tax_withheld: self.tax_withheld,
            has_home_office: self.has_home_office,
            has_work_vehicle: self.has_work_vehicle,
            has_work_travel: self.has_work_travel,
            has_spouse: self.has_spouse,
            number_of_dependents: self.number_of_dependents,
            financial_year_end,
        })
    }

    fn occupation_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.occupation.trim().is_empty() {
            errors.insert("occupation", "Select your occupation");
        }
        errors
    }

    fn employment_income(&self) -> Result<EmploymentType, FieldErrors> {
        let mut errors = FieldErrors::new();
        let employment_type = match self.employment_type.parse::<EmploymentType>() {
            Ok(t) => Some(t),
            Err(_) => {
                errors.insert("employmentType", "Select your employment type");
                None
            }
        };
        if self.income_range.trim().is_empty() {
            errors.insert("incomeRange", "Select your income range");
        }
        match employment_type {
            Some(t) if errors.is_empty() => Ok(t),
            _ => Err(errors),
        }
    }

    fn identity_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.first_name.trim().is_empty() {
            errors.insert("firstName", "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.insert("lastName", "Last name is required");
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            errors.insert("email", "Valid email is required");
        }
        errors
    }

    fn financial_year_end(&self) -> Result<FinancialYearEnd, FieldErrors> {
        self.financial_year_end.parse().map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.insert("financialYearEnd", "Select a financial year end");
            errors
        })
    }
}
