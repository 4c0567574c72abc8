//! Backends for exercising failure paths in tests.

use super::memory::MemoryBackend;
use super::traits::KeyValueBackend;
use crate::error::StoreError;

/// Reads come from the wrapped backend; every write fails.
pub(crate) struct ReadOnlyBackend(MemoryBackend);

impl ReadOnlyBackend {
    pub(crate) fn new(inner: MemoryBackend) -> Self {
        Self(inner)
    }

    pub(crate) fn empty() -> Self {
        Self(MemoryBackend::new())
    }
}

impl KeyValueBackend for ReadOnlyBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(std::io::Error::other("disk full").into())
    }

    fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(std::io::Error::other("disk full").into())
    }
}
