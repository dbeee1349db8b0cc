//! Typed settings view over a [`SettingsStore`].

use crate::{SettingsKeys, SettingsStore, StorageResult};
use serde::{Deserialize, Serialize};
use sora_i18n::Locale;
use sora_theme::ThemeMode;
use tracing::warn;

/// Settings schema version written alongside the values.
pub const SETTINGS_VERSION: &str = "1.0.0";

/// Typed application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub locale: Locale,
    pub theme_mode: ThemeMode,
    pub version: String,
}

/// Environment-derived defaults supplied by the shell at startup.
///
/// Passed in explicitly so this crate never probes the OS itself.
#[derive(Debug, Clone, Copy)]
pub struct OsDefaults {
    /// Locale detected from the OS environment.
    pub locale: Locale,
    /// Whether the OS currently prefers a dark appearance.
    pub prefers_dark: bool,
}

impl Default for OsDefaults {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            prefers_dark: false,
        }
    }
}

/// Manages typed settings over a string-keyed store.
pub struct SettingsManager {
    store: Box<dyn SettingsStore>,
    defaults: OsDefaults,
}

impl SettingsManager {
    pub fn new(store: Box<dyn SettingsStore>, defaults: OsDefaults) -> Self {
        Self { store, defaults }
    }

    /// The OS defaults this manager seeds absent fields from.
    pub fn os_defaults(&self) -> OsDefaults {
        self.defaults
    }

    /// Settings used when nothing has been stored yet.
    pub fn default_settings(&self) -> AppSettings {
        AppSettings {
            locale: self.defaults.locale,
            theme_mode: ThemeMode::default(),
            version: SETTINGS_VERSION.to_string(),
        }
    }

    /// Materialize typed settings. Each field falls back to its default
    /// independently; read failures are logged and absorbed so startup
    /// always produces usable settings.
    pub fn load(&self) -> AppSettings {
        let defaults = self.default_settings();

        let locale = match self.store.get(SettingsKeys::LOCALE) {
            Ok(Some(tag)) => Locale::from_tag(&tag),
            Ok(None) => defaults.locale,
            Err(err) => {
                warn!(key = SettingsKeys::LOCALE, error = %err, "Failed to read setting, using default");
                defaults.locale
            }
        };

        let theme_mode = match self.store.get(SettingsKeys::THEME_MODE) {
            Ok(Some(raw)) => ThemeMode::from_str(&raw),
            Ok(None) => defaults.theme_mode,
            Err(err) => {
                warn!(key = SettingsKeys::THEME_MODE, error = %err, "Failed to read setting, using default");
                defaults.theme_mode
            }
        };

        let version = match self.store.get(SettingsKeys::VERSION) {
            Ok(Some(version)) => version,
            Ok(None) => defaults.version.clone(),
            Err(err) => {
                warn!(key = SettingsKeys::VERSION, error = %err, "Failed to read setting, using default");
                defaults.version.clone()
            }
        };

        AppSettings {
            locale,
            theme_mode,
            version,
        }
    }

    /// Persist all fields and flush the store.
    pub fn save(&mut self, settings: &AppSettings) -> StorageResult<()> {
        self.store.set(SettingsKeys::LOCALE, settings.locale.as_str())?;
        self.store
            .set(SettingsKeys::THEME_MODE, settings.theme_mode.as_str())?;
        self.store.set(SettingsKeys::VERSION, &settings.version)?;
        self.store.save()
    }

    /// Change the stored locale and flush.
    pub fn update_locale(&mut self, locale: Locale) -> StorageResult<()> {
        self.store.set(SettingsKeys::LOCALE, locale.as_str())?;
        self.store.save()
    }

    /// Change the stored theme mode and flush.
    pub fn update_theme_mode(&mut self, mode: ThemeMode) -> StorageResult<()> {
        self.store.set(SettingsKeys::THEME_MODE, mode.as_str())?;
        self.store.save()
    }

    /// Drop all stored values and return to OS-derived defaults.
    pub fn reset(&mut self) -> StorageResult<AppSettings> {
        self.store.clear()?;
        self.store.save()?;
        Ok(self.default_settings())
    }
}
