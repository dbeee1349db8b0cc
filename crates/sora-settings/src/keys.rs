//! Well-known settings keys.

/// Namespace for the keys used by the app.
pub struct SettingsKeys;

impl SettingsKeys {
    /// UI locale tag ("ja", "en", "pt", "de").
    pub const LOCALE: &'static str = "locale";
    /// Theme mode ("light", "dark", "system").
    pub const THEME_MODE: &'static str = "themeMode";
    /// Settings schema version.
    pub const VERSION: &'static str = "version";
}
