//! Storage trait for string-keyed preferences.

use crate::StorageResult;

/// Flat string-keyed preference storage.
///
/// `get` distinguishes a key that was never set (`None`) from one set to an
/// empty string. Mutations are buffered until `save` flushes them to the
/// backing medium.
pub trait SettingsStore: Send + Sync {
    /// Get a value, or `None` if the key was never set.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Set a value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Remove all keys.
    fn clear(&mut self) -> StorageResult<()>;

    /// Flush buffered mutations to the backing medium.
    fn save(&self) -> StorageResult<()>;
}
