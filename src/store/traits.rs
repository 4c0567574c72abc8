//! `KeyValueBackend` trait — the minimal durable storage interface.
//!
//! Values are opaque serialized documents keyed by a stable string. Typed
//! access and safe defaulting live one layer up in `PersistentStore`.

use crate::error::StoreError;

/// Backend-agnostic key/value storage.
///
/// Every `set` fully replaces the prior value for that key. Backends make no
/// promise about coordination between separate processes: last write wins.
pub trait KeyValueBackend: Send + Sync {
    /// Load the raw document stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing anything already there.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value under `key`. Returns whether anything was removed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Check that a key is safe to use as a storage identifier.
///
/// Keys are limited to ASCII letters, digits, `.`, `_` and `-`, and must not
/// start with a dot, so the file backend can map them straight to filenames.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_app_state_key() {
        assert!(validate_key("aussie-tax-app-state").is_ok());
        assert!(validate_key("profile_v2.backup").is_ok());
    }

    #[test]
    fn rejects_unsafe_keys() {
        for key in ["", ".hidden", "../up", "a/b", "with space", "tab\tkey"] {
            assert!(
                matches!(validate_key(key), Err(StoreError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }
}
