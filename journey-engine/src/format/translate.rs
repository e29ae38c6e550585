//! Translation lookup for unit suffixes and fixed messages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The strings the engine needs from the i18n layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TranslationKey {
    /// Suffix after "H:MM", e.g. "h"
    HoursShort,
    /// Suffix after a bare minute count, e.g. "min"
    MinutesShort,
    /// Shown when an activity would end before it starts
    EndBeforeStart,
    /// Placeholder for a value that cannot be computed, e.g. "--"
    Unavailable,
    /// Label after a day count in multi-day mode
    Days,
    /// Label after a night count in multi-day mode
    Nights,
}

/// Resolves a key to display text.
///
/// Language fallback is the caller's concern; by the time a key reaches the
/// engine it must resolve to something.
pub trait Translate {
    fn translate(&self, key: TranslationKey) -> String;
}

impl<F> Translate for F
where
    F: Fn(TranslationKey) -> String,
{
    fn translate(&self, key: TranslationKey) -> String {
        self(key)
    }
}

/// Built-in English strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishUnits;

impl Translate for EnglishUnits {
    fn translate(&self, key: TranslationKey) -> String {
        match key {
            TranslationKey::HoursShort => "h",
            TranslationKey::MinutesShort => "min",
            TranslationKey::EndBeforeStart => "End is before start",
            TranslationKey::Unavailable => "--",
            TranslationKey::Days => "days",
            TranslationKey::Nights => "nights",
        }
        .to_string()
    }
}

/// A translation table, typically deserialized from JSON.
///
/// Keys missing from the table resolve to [`EnglishUnits`].
///
/// # Examples
///
/// ```
/// use journey_engine::format::{Translate, TranslationKey, Translations};
///
/// let t: Translations = serde_json::from_str(r#"{"hoursShort": " Std."}"#).unwrap();
/// assert_eq!(t.translate(TranslationKey::HoursShort), " Std.");
/// assert_eq!(t.translate(TranslationKey::MinutesShort), "min");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    entries: HashMap<TranslationKey, String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text for a key.
    pub fn insert(&mut self, key: TranslationKey, text: impl Into<String>) {
        self.entries.insert(key, text.into());
    }
}

impl Translate for Translations {
    fn translate(&self, key: TranslationKey) -> String {
        self.entries
            .get(&key)
            .cloned()
            .unwrap_or_else(|| EnglishUnits.translate(key))
    }
}
