//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::store::{APP_STATE_KEY, validate_key};

/// Runtime configuration, built from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding one JSON document per store key.
    pub data_dir: PathBuf,
    /// Key the root `AppState` is persisted under.
    pub state_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_key: APP_STATE_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Build config from `TAX_MATE_DATA_DIR` and `TAX_MATE_STATE_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("TAX_MATE_DATA_DIR").ok(),
            std::env::var("TAX_MATE_STATE_KEY").ok(),
        )
    }

    fn from_vars(data_dir: Option<String>, state_key: Option<String>) -> Result<Self, ConfigError> {
        let data_dir = data_dir
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let state_key = state_key
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| APP_STATE_KEY.to_string());

        validate_key(&state_key).map_err(|e| ConfigError::InvalidValue {
            key: "TAX_MATE_STATE_KEY".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            data_dir,
            state_key,
        })
    }
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".tax-mate")
}
