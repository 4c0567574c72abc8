//! Error types for Tax Mate.

use rust_decimal::Decimal;
use uuid::Uuid;

/// Top-level error type for the app core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Deduction error: {0}")]
    Deduction(#[from] DeductionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Durable key/value storage errors.
///
/// Only writes surface these. Reads fall back to the caller's default.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),
}

/// Rejected deduction edits.
#[derive(Debug, thiserror::Error)]
pub enum DeductionError {
    #[error("Deduction amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Deduction amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("Claim percentage must be between 0 and 100, got {percentage}")]
    InvalidClaimPercentage { percentage: Decimal },

    #[error("Deduction description is required")]
    MissingDescription,

    #[error("Deduction {id} not found")]
    NotFound { id: Uuid },
}

/// Result type alias for the app core.
pub type Result<T> = std::result::Result<T, Error>;
