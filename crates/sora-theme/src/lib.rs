//! Theme resolution and native chrome styling.
//!
//! The user picks a mode (light, dark, or follow the OS); this crate derives
//! the concrete theme and pushes the matching status bar colors through a
//! [`ChromeBridge`] whenever an input changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// User-selected theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// Parse a stored mode string, defaulting to `System` for unknown input.
    pub fn from_str(s: &str) -> ThemeMode {
        match s {
            "light" => ThemeMode::Light,
            "dark" => ThemeMode::Dark,
            _ => ThemeMode::System,
        }
    }
}

/// Concrete theme after resolving `System` against the OS preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }
}

/// Resolve a mode against the OS dark-mode preference.
pub fn resolve(mode: ThemeMode, os_prefers_dark: bool) -> ResolvedTheme {
    match mode {
        ThemeMode::Light => ResolvedTheme::Light,
        ThemeMode::Dark => ResolvedTheme::Dark,
        ThemeMode::System => {
            if os_prefers_dark {
                ResolvedTheme::Dark
            } else {
                ResolvedTheme::Light
            }
        }
    }
}

/// Status bar colors for one resolved theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text_color: &'static str,
    pub bar_color: &'static str,
}

impl Palette {
    pub fn for_theme(theme: ResolvedTheme) -> Palette {
        match theme {
            ResolvedTheme::Dark => Palette {
                text_color: "#ffffff",
                bar_color: "#000000",
            },
            ResolvedTheme::Light => Palette {
                text_color: "#000000",
                bar_color: "#ffffff",
            },
        }
    }
}

/// Chrome bridge error. The native side reports failures as plain strings.
#[derive(Error, Debug)]
#[error("Chrome error: {0}")]
pub struct ChromeError(pub String);

/// Outward seam to the platform chrome (status bar, window decorations).
pub trait ChromeBridge: Send + Sync {
    /// Push the resolved theme and its colors to the native side.
    fn set_status_bar(
        &self,
        theme: ResolvedTheme,
        text_color: &str,
        bar_color: &str,
    ) -> Result<(), ChromeError>;
}

/// Owns the theme inputs and notifies the chrome on every change.
pub struct ThemeController {
    mode: ThemeMode,
    os_prefers_dark: bool,
    bridge: Box<dyn ChromeBridge>,
}

impl ThemeController {
    /// Create a controller and push the initial theme to the chrome.
    pub fn new(mode: ThemeMode, os_prefers_dark: bool, bridge: Box<dyn ChromeBridge>) -> Self {
        let controller = Self {
            mode,
            os_prefers_dark,
            bridge,
        };
        controller.apply();
        controller
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// The currently resolved theme.
    pub fn resolved(&self) -> ResolvedTheme {
        resolve(self.mode, self.os_prefers_dark)
    }

    /// Change the user-selected mode and re-apply.
    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.mode = mode;
        self.apply();
    }

    /// Feed an OS dark-mode preference change and re-apply.
    pub fn set_os_prefers_dark(&mut self, prefers_dark: bool) {
        self.os_prefers_dark = prefers_dark;
        self.apply();
    }

    /// Push the current resolution to the chrome. Bridge failures are logged
    /// and swallowed; theming must never take the app down.
    pub fn apply(&self) {
        let theme = self.resolved();
        let palette = Palette::for_theme(theme);
        debug!(theme = theme.as_str(), "Applying theme");
        if let Err(err) = self
            .bridge
            .set_status_bar(theme, palette.text_color, palette.bar_color)
        {
            warn!(theme = theme.as_str(), error = %err, "Chrome bridge rejected theme update");
        }
    }
}
