//! Typed, fail-closed access on top of a `KeyValueBackend`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::file::FileBackend;
use super::memory::MemoryBackend;
use super::traits::{KeyValueBackend, validate_key};
use crate::error::StoreError;

/// Typed key/value store with safe defaulting.
///
/// `read` never fails: missing, unreadable, or malformed values all come back
/// as the caller's default. `write` serializes the whole value and replaces
/// whatever was stored before.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Open a file-backed store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(FileBackend::new(dir)?)))
    }

    /// Create a non-durable store (for tests).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Load and deserialize the value under `key`, or return `default`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "No stored value, using default");
                return default;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load stored value, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value is malformed, using default");
                default
            }
        }
    }

    /// Serialize `value` and store it under `key`.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        validate_key(key)?;
        let raw =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.set(key, &raw)
    }

    /// Remove the value under `key`. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.backend.delete(key)
    }

    /// Raw access for callers that need to inspect the stored document.
    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }
}
