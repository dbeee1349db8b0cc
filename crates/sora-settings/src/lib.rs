//! User preference persistence.
//!
//! Preferences live in a flat string-keyed store behind the [`SettingsStore`]
//! trait; [`FileStore`] is the JSON file backend used by the app and
//! [`MemoryStore`] backs tests. [`SettingsManager`] materializes the typed
//! [`AppSettings`] view on top.

mod error;
mod file;
mod keys;
mod manager;
mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use keys::SettingsKeys;
pub use manager::{AppSettings, OsDefaults, SettingsManager, SETTINGS_VERSION};
pub use memory::MemoryStore;
pub use traits::SettingsStore;
