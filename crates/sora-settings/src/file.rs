//! JSON file backend for settings.

use crate::{SettingsStore, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings stored as one flat JSON object on disk.
///
/// The whole file is read at construction and rewritten on `save`.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Load the store from a file. A missing file yields an empty store.
    pub fn load(path: PathBuf) -> StorageResult<Self> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let parsed: serde_json::Value = serde_json::from_str(&content)?;
            let object = parsed
                .as_object()
                .ok_or_else(|| StorageError::InvalidData("settings root is not an object".to_string()))?;
            object
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// The file this store persists to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for FileStore {
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
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_empty_store() {
        let dir = tempdir().unwrap();
        let store = FileStore::load(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get("locale").unwrap(), None);
    }

    #[test]
    fn set_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = FileStore::load(path.clone()).unwrap();
        store.set("locale", "en").unwrap();
        store.set("themeMode", "dark").unwrap();
        store.save().unwrap();

        let reloaded = FileStore::load(path).unwrap();
        assert_eq!(reloaded.get("locale").unwrap(), Some("en".to_string()));
        assert_eq!(reloaded.get("themeMode").unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn unsaved_changes_are_not_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = FileStore::load(path.clone()).unwrap();
        store.set("locale", "pt").unwrap();
        // no save()

        let reloaded = FileStore::load(path).unwrap();
        assert_eq!(reloaded.get("locale").unwrap(), None);
    }

    #[test]
    fn empty_string_is_distinct_from_absent() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::load(dir.path().join("settings.json")).unwrap();

        store.set("note", "").unwrap();
        assert_eq!(store.get("note").unwrap(), Some(String::new()));

        store.remove("note").unwrap();
        assert_eq!(store.get("note").unwrap(), None);
    }

    #[test]
    fn clear_removes_all_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = FileStore::load(path.clone()).unwrap();
        store.set("locale", "de").unwrap();
        store.set("version", "1.0.0").unwrap();
        store.clear().unwrap();
        store.save().unwrap();

        let reloaded = FileStore::load(path).unwrap();
        assert_eq!(reloaded.get("locale").unwrap(), None);
        assert_eq!(reloaded.get("version").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json at all").unwrap();

        assert!(FileStore::load(path).is_err());
    }

    #[test]
    fn non_object_root_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(FileStore::load(path).is_err());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = FileStore::load(path.clone()).unwrap();
        store.set("locale", "ja").unwrap();
        store.save().unwrap();

        assert!(path.exists());
    }
}
