//! Option lists offered during onboarding.

use serde::Serialize;

use crate::onboarding::{EmploymentType, FinancialYearEnd};

/// A selectable value with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

pub const OCCUPATIONS: &[SelectOption] = &[
    opt("tradie", "Tradie (Plumber, Electrician, Carpenter)"),
    opt("office-worker", "Office Worker / Administrator"),
    opt("healthcare", "Healthcare Professional"),
    opt("teacher", "Teacher / Educator"),
    opt("hospitality", "Hospitality / Retail"),
    opt("it-professional", "IT Professional / Developer"),
    opt("sales", "Sales / Marketing"),
    opt("other", "Other"),
];

/// Employment types, labelled from [`EmploymentType::label`].
pub fn employment_types() -> Vec<SelectOption> {
    EmploymentType::ALL
        .into_iter()
        .map(|t| opt(t.as_str(), t.label()))
        .collect()
}

pub const INCOME_RANGES: &[SelectOption] = &[
    opt("0-45000", "$0 - $45,000"),
    opt("45001-120000", "$45,001 - $120,000"),
    opt("120001-180000", "$120,001 - $180,000"),
    opt("180001+", "$180,001+"),
];

/// Financial-year ends, labelled from [`FinancialYearEnd::label`].
pub fn financial_year_ends() -> Vec<SelectOption> {
    FinancialYearEnd::ALL
        .into_iter()
        .map(|fy| opt(fy.as_str(), fy.label()))
        .collect()
}

/// Label for `value` in `options`, if listed.
pub fn label_for(options: &[SelectOption], value: &str) -> Option<&'static str> {
    options.iter().find(|o| o.value == value).map(|o| o.label)
}
