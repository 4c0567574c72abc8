//! User profile and the closed enumerations it is built from.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the taxpayer earns their income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    Employee,
    SelfEmployed,
    Contractor,
    Both,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 4] = [
        Self::Employee,
        Self::SelfEmployed,
        Self::Contractor,
        Self::Both,
    ];

    /// Wire identifier, e.g. `"self-employed"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::SelfEmployed => "self-employed",
            Self::Contractor => "contractor",
            Self::Both => "both",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Employee => "Employee (PAYG)",
            Self::SelfEmployed => "Self-Employed / Sole Trader",
            Self::Contractor => "Contractor / Freelancer",
            Self::Both => "Multiple Income Sources",
        }
    }
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown employment type: {s}"))
    }
}

/// When the taxpayer's financial year closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FinancialYearEnd {
    #[serde(rename = "31-12")]
    CalendarYear,
    #[default]
    #[serde(rename = "30-06")]
    AustralianFy,
}

impl FinancialYearEnd {
    pub const ALL: [FinancialYearEnd; 2] = [Self::CalendarYear, Self::AustralianFy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CalendarYear => "31-12",
            Self::AustralianFy => "30-06",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CalendarYear => "Calendar year (31 Dec)",
            Self::AustralianFy => "Australian FY (30 Jun)",
        }
    }
}

impl std::fmt::Display for FinancialYearEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinancialYearEnd {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fy| fy.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown financial year end: {s}"))
    }
}

/// Taxpayer profile built during onboarding.
///
/// Stored inside `AppState.user`. Mid-onboarding it is a provisional profile
/// whose identity fields are still empty; see [`UserProfile::is_complete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,

    pub occupation: String,
    pub employment_type: EmploymentType,
    pub income_range: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub annual_income: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub tax_withheld: Option<Decimal>,

    pub has_home_office: bool,
    pub has_work_vehicle: bool,
    pub has_work_travel: bool,

    pub has_spouse: bool,
    pub number_of_dependents: u32,

    pub financial_year_end: FinancialYearEnd,
}

impl UserProfile {
    /// Profile created once occupation, employment type and income range are
    /// known. Everything else starts empty.
    pub fn provisional(
        occupation: impl Into<String>,
        employment_type: EmploymentType,
        income_range: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            occupation: occupation.into(),
            employment_type,
            income_range: income_range.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: None,
            employer: None,
            annual_income: None,
            tax_withheld: None,
            has_home_office: false,
            has_work_vehicle: false,
            has_work_travel: false,
            has_spouse: false,
            number_of_dependents: 0,
            financial_year_end: FinancialYearEnd::default(),
        }
    }

    /// Whether every required field is non-blank.
    pub fn is_complete(&self) -> bool {
        [
            &self.occupation,
            &self.income_range,
            &self.first_name,
            &self.last_name,
            &self.email,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
