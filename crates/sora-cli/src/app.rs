//! Application context wiring.
//!
//! Builds every long-lived object explicitly at startup: paths, config,
//! database, settings, translator, theme controller, and session manager.

use anyhow::Context as _;
use sora_auth::{SessionManager, XrpcClient};
use sora_core::{Config, Paths};
use sora_db::Database;
use sora_i18n::{Locale, Translator};
use sora_settings::{AppSettings, FileStore, MemoryStore, OsDefaults, SettingsManager};
use sora_theme::{ChromeBridge, ChromeError, ResolvedTheme, ThemeController};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Chrome bridge for a headless shell: there is no native status bar, so
/// theme applications are only logged.
pub struct LoggingChromeBridge;

impl ChromeBridge for LoggingChromeBridge {
    fn set_status_bar(
        &self,
        theme: ResolvedTheme,
        text_color: &str,
        bar_color: &str,
    ) -> Result<(), ChromeError> {
        debug!(
            theme = theme.as_str(),
            text_color,
            bar_color,
            "Status bar theme"
        );
        Ok(())
    }
}

/// Everything the commands need, constructed once at startup.
pub struct AppContext {
    pub paths: Paths,
    pub config: Config,
    pub settings: AppSettings,
    pub settings_manager: SettingsManager,
    pub translator: Translator,
    pub theme: ThemeController,
    pub db: Arc<Mutex<Database>>,
    pub session: Arc<SessionManager>,
}

impl AppContext {
    /// Build the full context and attempt to resume the stored session.
    pub async fn init(paths: Paths, config: Config, os_defaults: OsDefaults) -> anyhow::Result<Self> {
        paths.ensure_dirs().context("creating runtime directories")?;

        let db = Arc::new(Mutex::new(
            Database::open(&paths.database_file()).context("opening account database")?,
        ));

        // A broken settings file must not block startup
        let store: Box<dyn sora_settings::SettingsStore> =
            match FileStore::load(paths.settings_file()) {
                Ok(store) => Box::new(store),
                Err(err) => {
                    tracing::warn!(error = %err, "Settings file unreadable, starting from defaults");
                    Box::new(MemoryStore::new())
                }
            };
        let settings_manager = SettingsManager::new(store, os_defaults);
        let settings = settings_manager.load();
        info!(
            locale = settings.locale.as_str(),
            theme = settings.theme_mode.as_str(),
            "Settings loaded"
        );

        let translator = Translator::load(settings.locale);
        let theme = ThemeController::new(
            settings.theme_mode,
            os_defaults.prefers_dark,
            Box::new(LoggingChromeBridge),
        );

        let session = Arc::new(SessionManager::new(
            Arc::clone(&db),
            translator.clone(),
            XrpcClient::factory(),
        ));

        let resumed = session.resume_from_storage().await;
        debug!(resumed, "Startup resume finished");

        Ok(Self {
            paths,
            config,
            settings,
            settings_manager,
            translator,
            theme,
            db,
            session,
        })
    }
}

/// Detect OS defaults from the environment (`LC_ALL`/`LANG` for the locale).
pub fn detect_os_defaults() -> OsDefaults {
    let tag = std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LANG"))
        .unwrap_or_default();
    OsDefaults {
        locale: Locale::from_tag(&tag),
        prefers_dark: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sora_auth::guard::{self, RouteDecision};
    use tempfile::tempdir;

    fn test_defaults() -> OsDefaults {
        OsDefaults {
            locale: Locale::En,
            prefers_dark: false,
        }
    }

    #[tokio::test]
    async fn init_on_empty_base_dir_lands_on_login() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        let config = Config::default();

        let ctx = AppContext::init(paths, config, test_defaults()).await.unwrap();

        let snapshot = ctx.session.snapshot();
        assert!(snapshot.initialized);
        assert!(!snapshot.authenticated);
        assert_eq!(guard::decide_from_snapshot(&snapshot), RouteDecision::Login);
        assert_eq!(ctx.settings.locale, Locale::En);
    }

    #[tokio::test]
    async fn init_creates_runtime_directories() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("soramoyou");
        let paths = Paths::with_base_dir(base.clone());

        AppContext::init(paths, Config::default(), test_defaults())
            .await
            .unwrap();

        assert!(base.is_dir());
        assert!(base.join("soramoyou.db").exists());
    }

    #[tokio::test]
    async fn corrupt_settings_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        paths.ensure_dirs().unwrap();
        std::fs::write(paths.settings_file(), "{{{ not json").unwrap();

        let ctx = AppContext::init(paths, Config::default(), test_defaults())
            .await
            .unwrap();

        assert_eq!(ctx.settings.locale, Locale::En);
        assert_eq!(ctx.settings.theme_mode, sora_theme::ThemeMode::System);
    }
}
