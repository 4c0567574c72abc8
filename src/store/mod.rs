//! Persistence layer — durable key/value storage and the app state store.

pub mod app;
pub mod file;
pub mod memory;
pub mod persistent;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{APP_STATE_KEY, AppState, AppStore, CurrentStep, StateEvent};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use persistent::PersistentStore;
pub use traits::{KeyValueBackend, validate_key};
