//! In-memory settings store for tests.

use crate::{SettingsStore, StorageResult};
use std::collections::BTreeMap;

/// In-memory store. `save` is a no-op.
#[derive(Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.values.clear();
        Ok(())
    }

    fn save(&self) -> StorageResult<()> {
        Ok(())
    }
}
