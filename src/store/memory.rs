//! In-memory backend for tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{KeyValueBackend, validate_key};
use crate::error::StoreError;

/// Non-durable backend keeping documents in a map.
#[derive(Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        Ok(values.remove(key).is_some())
    }
}
