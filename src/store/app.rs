//! `AppState` and the `AppStore` that owns it.
//!
//! The store keeps the current state in memory, persists every change as a
//! whole-object replacement, and fans change notifications out to
//! subscribers.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::persistent::PersistentStore;
use crate::deductions::Deduction;
use crate::error::StoreError;
use crate::onboarding::UserProfile;

/// Key the root aggregate is persisted under.
pub const APP_STATE_KEY: &str = "aussie-tax-app-state";

/// Coarse marker of where the user last was in onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentStep {
    Welcome,
    Occupation,
    Employment,
    Completed,
}

/// Root persisted aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    /// Provisional or final profile; `None` until onboarding captures one.
    pub user: Option<UserProfile>,
    /// Claimed expenses in insertion order.
    pub deductions: Vec<Deduction>,
    /// Set only once `user` is fully populated.
    pub onboarding_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<CurrentStep>,
}

impl AppState {
    /// Whether the completion flag agrees with the profile's contents.
    pub fn is_consistent(&self) -> bool {
        !self.onboarding_complete || self.user.as_ref().is_some_and(UserProfile::is_complete)
    }

    /// Whether collaborators should route the user into onboarding.
    pub fn needs_onboarding(&self) -> bool {
        !self.onboarding_complete
    }
}

/// Change notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// The state was replaced with this value.
    Updated(AppState),
    /// The state was reset to defaults (logout).
    Reset,
}

/// Explicit owner of the current `AppState`.
///
/// The state is loaded lazily on first access. All mutations replace the
/// whole value, persist it, then notify subscribers.
pub struct AppStore {
    store: PersistentStore,
    key: String,
    state: RwLock<Option<AppState>>,
    subscribers: Mutex<Vec<Sender<StateEvent>>>,
}

impl AppStore {
    /// Create a store persisting under the default key.
    pub fn new(store: PersistentStore) -> Self {
        Self::with_key(store, APP_STATE_KEY)
    }

    /// Create a store persisting under a custom key.
    pub fn with_key(store: PersistentStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            state: RwLock::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Create a non-durable store (for tests).
    pub fn in_memory() -> Self {
        Self::new(PersistentStore::in_memory())
    }

    /// The key the state is persisted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current state, loading it from storage on first access.
    pub fn get_state(&self) -> AppState {
        {
            let cached = self.state.read().unwrap_or_else(|e| e.into_inner());
            if let Some(state) = cached.as_ref() {
                return state.clone();
            }
        }
        let mut cached = self.state.write().unwrap_or_else(|e| e.into_inner());
        cached.get_or_insert_with(|| self.load()).clone()
    }

    /// Replace the whole state.
    pub fn set_state(&self, next: AppState) -> Result<(), StoreError> {
        {
            let mut cached = self.state.write().unwrap_or_else(|e| e.into_inner());
            self.store.write(&self.key, &next)?;
            *cached = Some(next.clone());
        }
        debug!(
            onboarding_complete = next.onboarding_complete,
            deductions = next.deductions.len(),
            "App state replaced"
        );
        self.notify(StateEvent::Updated(next));
        Ok(())
    }

    /// Read-modify-write the state and return the new value.
    ///
    /// `f` sees the full current value; the result is written back whole.
    pub fn update<F>(&self, f: F) -> Result<AppState, StoreError>
    where
        F: FnOnce(&mut AppState),
    {
        self.try_update(|state| {
            f(state);
            Ok(())
        })
    }

    /// Like [`AppStore::update`], but `f` may reject the change.
    ///
    /// The lookup and the write happen under one lock. On `Err` nothing is
    /// written and the cached state is untouched.
    pub fn try_update<F, E>(&self, f: F) -> Result<AppState, E>
    where
        F: FnOnce(&mut AppState) -> Result<(), E>,
        E: From<StoreError>,
    {
        let next = {
            let mut cached = self.state.write().unwrap_or_else(|e| e.into_inner());
            let mut next = match cached.as_ref() {
                Some(state) => state.clone(),
                None => self.load(),
            };
            f(&mut next)?;
            self.store.write(&self.key, &next)?;
            *cached = Some(next.clone());
            next
        };
        self.notify(StateEvent::Updated(next.clone()));
        Ok(next)
    }

    /// Restore defaults (logout). The persisted document is removed.
    pub fn reset_state(&self) -> Result<(), StoreError> {
        {
            let mut cached = self.state.write().unwrap_or_else(|e| e.into_inner());
            self.store.remove(&self.key)?;
            *cached = Some(AppState::default());
        }
        info!(key = %self.key, "App state reset to defaults");
        self.notify(StateEvent::Reset);
        Ok(())
    }

    /// Drop the cached value and re-read from storage.
    ///
    /// Picks up writes made by another process sharing the same data.
    pub fn reload(&self) -> AppState {
        let fresh = self.load();
        let mut cached = self.state.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(fresh.clone());
        fresh
    }

    /// Subscribe to state changes. Each collaborator calls this.
    pub fn subscribe(&self) -> Receiver<StateEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Number of live subscribers (as of the last notification).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn load(&self) -> AppState {
        self.store.read(&self.key, AppState::default())
    }

    fn notify(&self, event: StateEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        // Receivers that were dropped are pruned here
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
