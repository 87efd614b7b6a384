//! `inkmind settings` command implementation.

use crate::cli::open_store;
use crate::config::Config;
use crate::core::App;
use crate::core::prompt::author_level_prompt;
use crate::core::settings::{AppSettings, AuthorLevel, Pov, ResponseLength, Theme, Tone};
use crate::error::{Error, Result};

/// Requested changes; `None` leaves a field as it is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SettingsChange {
    pub tone: Option<Tone>,
    pub pov: Option<Pov>,
    pub length: Option<ResponseLength>,
    pub creativity: Option<f64>,
    pub author_level: Option<AuthorLevel>,
    pub custom_instructions: Option<String>,
    pub theme: Option<Theme>,
}

impl SettingsChange {
    /// Whether nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the requested fields.
    pub fn apply(self, settings: &mut AppSettings) {
        let writing = &mut settings.writing;
        if let Some(tone) = self.tone {
            writing.tone = tone;
        }
        if let Some(pov) = self.pov {
            writing.pov = pov;
        }
        if let Some(length) = self.length {
            writing.response_length = length;
        }
        if let Some(creativity) = self.creativity {
            writing.creativity_level = creativity;
        }
        if let Some(level) = self.author_level {
            writing.author_level = level;
        }
        if let Some(custom) = self.custom_instructions {
            writing.custom_instructions = custom;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
    }
}

/// Run `settings show`.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn show(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let app = App::load(&store);
    print!("{}", describe(app.settings()));
    Ok(())
}

/// Run `settings set`.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, nothing was requested, or
/// the creativity value is not a number in `[0, 1]`.
pub fn set(config: &Config, change: SettingsChange) -> Result<()> {
    if change.is_empty() {
        return Err(Error::Validation(
            "Không có thay đổi nào. Xem `inkmind settings set --help`.".to_string(),
        ));
    }
    if change
        .creativity
        .is_some_and(|c| !(0.0..=1.0).contains(&c))
    {
        return Err(Error::Validation(
            "Độ sáng tạo phải nằm trong khoảng 0 đến 1.".to_string(),
        ));
    }

    let store = open_store(config)?;
    let mut app = App::load(&store);
    app.update_settings(|s| change.apply(s));

    print!("{}", describe(app.settings()));
    Ok(())
}

/// Human-readable summary of the settings.
#[must_use]
pub fn describe(settings: &AppSettings) -> String {
    let w = &settings.writing;
    let style = match author_level_prompt(w.author_level) {
        Some(prompt) => prompt.to_string(),
        None if w.custom_instructions.trim().is_empty() => "(trống)".to_string(),
        None => w.custom_instructions.clone(),
    };
    format!(
        "Giọng văn:       {}\n\
         Ngôi kể:         {}\n\
         Độ dài:          {}\n\
         Độ sáng tạo:     {:.2}\n\
         Trình độ:        {}\n\
         Văn phong:       {style}\n\
         Giao diện:       {:?}\n",
        w.tone, w.pov, w.response_length, w.creativity_level, w.author_level, settings.theme
    )
}
