//! File system paths for the app's runtime files.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths under the base directory.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.soramoyou)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.soramoyou`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".soramoyou"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.soramoyou).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.soramoyou/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the account database path (~/.soramoyou/soramoyou.db).
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join("soramoyou.db")
    }

    /// Get the settings file path (~/.soramoyou/settings.json).
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Get the logs directory (~/.soramoyou/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
