//! Localization for Soramoyou.
//!
//! Translation tables are embedded at compile time and looked up by dotted
//! key path. A missing key resolves to the key itself so untranslated strings
//! stay visible instead of crashing the UI.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Supported UI locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
    Pt,
    De,
}

impl Locale {
    /// All supported locales, default first.
    pub fn all() -> [Locale; 4] {
        [Locale::Ja, Locale::En, Locale::Pt, Locale::De]
    }

    /// BCP 47 language tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ja => "ja",
            Locale::En => "en",
            Locale::Pt => "pt",
            Locale::De => "de",
        }
    }

    /// Parse a language tag leniently ("en-US" matches `En`). Unknown tags
    /// fall back to the default locale.
    pub fn from_tag(tag: &str) -> Locale {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match primary.as_str() {
            "ja" => Locale::Ja,
            "en" => Locale::En,
            "pt" => Locale::Pt,
            "de" => Locale::De,
            _ => Locale::default(),
        }
    }

    /// Display name in the locale's own language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::Ja => "日本語",
            Locale::En => "English",
            Locale::Pt => "Português",
            Locale::De => "Deutsch",
        }
    }
}

const JA_TABLE: &str = include_str!("../locales/ja.json");
const EN_TABLE: &str = include_str!("../locales/en.json");
const PT_TABLE: &str = include_str!("../locales/pt.json");
const DE_TABLE: &str = include_str!("../locales/de.json");

/// Translation lookup for one locale.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    table: Value,
}

impl Translator {
    /// Load the embedded table for a locale.
    ///
    /// The tables are validated JSON checked in alongside this crate, so a
    /// parse failure can only come from a corrupted build; in that case an
    /// empty table is used and every lookup falls back to the literal key.
    pub fn load(locale: Locale) -> Self {
        let raw = match locale {
            Locale::Ja => JA_TABLE,
            Locale::En => EN_TABLE,
            Locale::Pt => PT_TABLE,
            Locale::De => DE_TABLE,
        };
        let table = serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(locale = locale.as_str(), error = %err, "Failed to parse embedded translation table");
            Value::Object(serde_json::Map::new())
        });
        Self { locale, table }
    }

    /// The locale this translator resolves against.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Resolve a dotted key path ("auth.error.network") to its translation.
    ///
    /// Returns the literal key when any path segment is missing or the
    /// resolved value is not a string.
    pub fn translate(&self, key: &str) -> String {
        let mut node = &self.table;
        for segment in key.split('.') {
            match node.get(segment) {
                Some(child) => node = child,
                None => return key.to_string(),
            }
        }
        match node.as_str() {
            Some(text) => text.to_string(),
            None => key.to_string(),
        }
    }

    /// Resolve a key and substitute `{name}` style placeholders.
    pub fn translate_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.translate(key);
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}
