//! Tax Mate — profile onboarding, deduction tracking, and refund estimates.

pub mod catalog;
pub mod config;
pub mod deductions;
pub mod error;
pub mod onboarding;
pub mod store;
pub mod tax;
