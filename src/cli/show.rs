//! `inkmind show` command implementation.

use crate::cli::{format_local_time, open_store, print_message, resolve_session};
use crate::config::Config;
use crate::core::App;
use crate::error::{Error, Result};

/// Run the show command.
///
/// Prints a session's metadata and full message log.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the session is unknown.
pub fn run(config: &Config, session: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let app = App::load(&store);

    let id = resolve_session(&app, session)?;
    let session = app
        .sessions()
        .get(&id)
        .ok_or_else(|| Error::SessionNotFound(id.clone()))?;

    println!("# {}", session.title);
    println!("ID: {}", session.id);
    println!("Updated: {}", format_local_time(session.last_updated));
    println!("Messages: {}\n", session.messages.len());

    for message in &session.messages {
        print_message(message);
    }

    Ok(())
}
