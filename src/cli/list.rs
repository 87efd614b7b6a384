//! `inkmind list` command implementation.

use crate::cli::{format_local_time, open_store};
use crate::config::Config;
use crate::core::{App, Session};
use crate::error::Result;

/// Default number of sessions to show.
const DEFAULT_LIMIT: usize = 20;

/// Maximum length for title preview, in characters.
const TITLE_PREVIEW_LEN: usize = 40;

/// Run the list command.
///
/// Shows sessions, most recently updated first, marking the active one.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn run(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = open_store(config)?;
    let app = App::load(&store);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let sessions = app.sessions().sessions();
    let active = app.active().id.as_str();

    println!(
        "  {:<36} {:<16} {:>5}  Title",
        "Session ID", "Updated", "Msgs"
    );
    println!("{}", "─".repeat(100));

    for session in sessions.iter().take(limit) {
        let marker = if session.id == active { '*' } else { ' ' };
        println!("{marker} {}", format_row(session));
    }

    println!("{}", "─".repeat(100));
    println!(
        "Showing {} of {} session(s)",
        sessions.len().min(limit),
        sessions.len()
    );
    println!("Sessions are stored in: {}", config.storage.path.display());

    Ok(())
}

/// One table row, without the active marker.
fn format_row(session: &Session) -> String {
    format!(
        "{:<36} {:<16} {:>5}  {}",
        session.id,
        format_local_time(session.last_updated),
        session.messages.len(),
        format_title_preview(&session.title)
    )
}

/// Truncate a title on a character boundary.
fn format_title_preview(title: &str) -> String {
    if title.chars().count() > TITLE_PREVIEW_LEN {
        let cut: String = title.chars().take(TITLE_PREVIEW_LEN).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_preview_keeps_short_titles() {
        assert_eq!(format_title_preview("Rồng Lửa"), "Rồng Lửa");
    }

    #[test]
    fn title_preview_truncates_on_char_boundary() {
        let long = "ồ".repeat(60);
        let preview = format_title_preview(&long);
        assert_eq!(preview.chars().count(), TITLE_PREVIEW_LEN + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn row_contains_id_count_and_title() {
        let session = Session::new();
        let row = format_row(&session);
        assert!(row.starts_with(&session.id));
        assert!(row.contains(" 1  "));
        assert!(row.ends_with(&session.title));
    }
}
