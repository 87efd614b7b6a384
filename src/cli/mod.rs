//! CLI command implementations.
//!
//! Every command opens the file store under the configured home, loads the
//! application state from it, and writes back through the stores on change.

pub mod chat;
pub mod compile;
pub mod delete;
pub mod export;
pub mod list;
pub mod new;
pub mod rename;
pub mod send;
pub mod settings;
pub mod show;
pub mod stats;

use crate::config::Config;
use crate::core::App;
use crate::core::message::{Message, Role};
use crate::error::{Error, Result};
use crate::storage::FileBackend;
use chrono::{DateTime, Local};

/// Open the file store at the configured location.
///
/// # Errors
///
/// Returns an error if the store directory cannot be created.
pub fn open_store(config: &Config) -> Result<FileBackend> {
    FileBackend::new(config.storage.path.clone())
}

/// Resolve a session reference to a full ID.
///
/// `None` means the active session. Otherwise the reference must equal an ID
/// or be a prefix of exactly one.
///
/// # Errors
///
/// Returns `Error::SessionNotFound` when nothing matches and
/// `Error::Validation` when a prefix is ambiguous.
pub fn resolve_session(app: &App<'_>, reference: Option<&str>) -> Result<String> {
    let Some(reference) = reference.map(str::trim) else {
        return Ok(app.active().id.clone());
    };

    let sessions = app.sessions();
    if let Some(session) = sessions.get(reference) {
        return Ok(session.id.clone());
    }

    let matches: Vec<&str> = sessions
        .sessions()
        .into_iter()
        .filter(|s| !reference.is_empty() && s.id.starts_with(reference))
        .map(|s| s.id.as_str())
        .collect();

    match matches.as_slice() {
        [] => Err(Error::SessionNotFound(reference.to_string())),
        [id] => Ok((*id).to_string()),
        _ => Err(Error::Validation(format!(
            "Mã \"{reference}\" khớp với {} tác phẩm, hãy nhập dài hơn.",
            matches.len()
        ))),
    }
}

/// Format epoch milliseconds as local time for display.
#[must_use]
pub fn format_local_time(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis).map_or_else(
        || "-".to_string(),
        |utc| {
            let local: DateTime<Local> = utc.into();
            local.format("%Y-%m-%d %H:%M").to_string()
        },
    )
}

/// Print one message with a short header line.
pub fn print_message(message: &Message) {
    let header = match message.role {
        Role::User => "Bạn".to_string(),
        Role::Model => match (message.mode_used, message.word_count) {
            (Some(mode), Some(words)) => format!("Ink & Mind [{}] · {words} từ", mode.tag()),
            (Some(mode), None) => format!("Ink & Mind [{}]", mode.tag()),
            _ => "Ink & Mind".to_string(),
        },
    };
    println!("── {header} · {}", format_local_time(message.timestamp));
    println!("{}\n", message.text.trim_end());
}
