//! Writing-style settings and the settings store.
//!
//! Persisted settings are merged over the defaults one field at a time, so a
//! document written by an older version (or edited by hand) keeps every value
//! it still has and falls back to defaults for the rest.

use crate::error::Error;
use crate::storage::{KeyValueStore, SETTINGS_KEY};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Overall tone of the prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Tone {
    #[default]
    Neutral,
    Humorous,
    Dark,
    Romantic,
    Formal,
    Whimsical,
}

impl Tone {
    /// Wire and prompt name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Humorous => "Humorous",
            Self::Dark => "Dark",
            Self::Romantic => "Romantic",
            Self::Formal => "Formal",
            Self::Whimsical => "Whimsical",
        }
    }
}

/// Narrative point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Pov {
    #[default]
    Default,
    #[serde(rename = "First Person (I)")]
    FirstPerson,
    #[serde(rename = "Third Person Limited")]
    ThirdPersonLimited,
    #[serde(rename = "Third Person Omniscient")]
    ThirdPersonOmniscient,
}

impl Pov {
    /// Wire and prompt name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::FirstPerson => "First Person (I)",
            Self::ThirdPersonLimited => "Third Person Limited",
            Self::ThirdPersonOmniscient => "Third Person Omniscient",
        }
    }
}

/// Desired reply length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ResponseLength {
    /// Wire and prompt name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
        }
    }
}

/// Style-strength preset, or a custom instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AuthorLevel {
    Beginner,
    #[default]
    Professional,
    Legendary,
    Custom,
}

impl AuthorLevel {
    /// Wire and prompt name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Professional => "Professional",
            Self::Legendary => "Legendary",
            Self::Custom => "Custom",
        }
    }
}

/// Color theme. Stored for compatibility; the terminal ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Tone, Pov, ResponseLength, AuthorLevel);

/// Default creativity (generation temperature).
pub const DEFAULT_CREATIVITY: f64 = 0.7;

/// Style configuration applied to every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingSettings {
    pub tone: Tone,
    pub pov: Pov,
    pub response_length: ResponseLength,
    /// Generation temperature in `[0, 1]`.
    pub creativity_level: f64,
    pub author_level: AuthorLevel,
    /// Used only when `author_level` is `Custom`.
    pub custom_instructions: String,
}

impl Default for WritingSettings {
    fn default() -> Self {
        Self {
            tone: Tone::default(),
            pov: Pov::default(),
            response_length: ResponseLength::default(),
            creativity_level: DEFAULT_CREATIVITY,
            author_level: AuthorLevel::default(),
            custom_instructions: String::new(),
        }
    }
}

/// The persisted settings document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppSettings {
    pub writing: WritingSettings,
    pub theme: Theme,
}

/// Writing settings with every field optional, as read from storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialWritingSettings {
    pub tone: Option<Tone>,
    pub pov: Option<Pov>,
    pub response_length: Option<ResponseLength>,
    pub creativity_level: Option<f64>,
    pub author_level: Option<AuthorLevel>,
    pub custom_instructions: Option<String>,
}

/// Settings document with every field optional, as read from storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialAppSettings {
    pub writing: Option<PartialWritingSettings>,
    pub theme: Option<Theme>,
}

/// Read one field, treating a missing or invalid value as absent.
fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    object
        .get(key)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

impl PartialWritingSettings {
    /// Extract the fields present in a JSON object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        Self {
            tone: field(object, "tone"),
            pov: field(object, "pov"),
            response_length: field(object, "responseLength"),
            creativity_level: field(object, "creativityLevel"),
            author_level: field(object, "authorLevel"),
            custom_instructions: field(object, "customInstructions"),
        }
    }
}

impl PartialAppSettings {
    /// Extract the fields present in a JSON object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        Self {
            writing: object.get("writing").map(PartialWritingSettings::from_value),
            theme: field(object, "theme"),
        }
    }
}

/// Clamp a creativity value into `[0, 1]`; non-finite values are rejected.
#[must_use]
pub fn clamp_creativity(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

impl WritingSettings {
    /// Overlay the fields present in `partial`.
    #[must_use]
    pub fn merged(&self, partial: &PartialWritingSettings) -> Self {
        Self {
            tone: partial.tone.unwrap_or(self.tone),
            pov: partial.pov.unwrap_or(self.pov),
            response_length: partial.response_length.unwrap_or(self.response_length),
            creativity_level: partial
                .creativity_level
                .and_then(clamp_creativity)
                .unwrap_or(self.creativity_level),
            author_level: partial.author_level.unwrap_or(self.author_level),
            custom_instructions: partial
                .custom_instructions
                .clone()
                .unwrap_or_else(|| self.custom_instructions.clone()),
        }
    }
}

impl AppSettings {
    /// Overlay the fields present in `partial`, recursing into `writing`.
    #[must_use]
    pub fn merged(&self, partial: &PartialAppSettings) -> Self {
        Self {
            writing: partial
                .writing
                .as_ref()
                .map_or_else(|| self.writing.clone(), |w| self.writing.merged(w)),
            theme: partial.theme.unwrap_or(self.theme),
        }
    }
}

/// Merge persisted values over defaults.
#[must_use]
pub fn merge(defaults: &AppSettings, persisted: &PartialAppSettings) -> AppSettings {
    defaults.merged(persisted)
}

/// Load settings: persisted values over defaults, defaults on any failure.
#[must_use]
pub fn load_settings(store: &dyn KeyValueStore) -> AppSettings {
    let defaults = AppSettings::default();
    let json = match store.get(SETTINGS_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return defaults,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read settings, using defaults");
            return defaults;
        }
    };

    match serde_json::from_str::<Value>(&json) {
        Ok(value) => merge(&defaults, &PartialAppSettings::from_value(&value)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse settings, using defaults");
            defaults
        }
    }
}

/// Persist settings. Failures are logged and otherwise ignored.
pub fn save_settings(store: &dyn KeyValueStore, settings: &AppSettings) {
    let result = serde_json::to_string(settings)
        .map_err(Error::from)
        .and_then(|json| store.put(SETTINGS_KEY, &json));
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to save settings");
    }
}

/// Settings held for the lifetime of the application, saved on every change.
pub struct SettingsStore<'a> {
    store: &'a dyn KeyValueStore,
    settings: AppSettings,
}

impl fmt::Debug for SettingsStore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> SettingsStore<'a> {
    /// Load settings from the backend.
    pub fn load(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            settings: load_settings(store),
        }
    }

    /// Current settings.
    #[must_use]
    pub fn get(&self) -> &AppSettings {
        &self.settings
    }

    /// Apply a change and save.
    pub fn update(&mut self, change: impl FnOnce(&mut AppSettings)) {
        change(&mut self.settings);
        let writing = &mut self.settings.writing;
        writing.creativity_level =
            clamp_creativity(writing.creativity_level).unwrap_or(DEFAULT_CREATIVITY);
        save_settings(self.store, &self.settings);
    }
}
