//! `inkmind delete` command implementation.

use crate::cli::{open_store, resolve_session};
use crate::config::Config;
use crate::core::App;
use crate::error::Result;

/// Run the delete command.
///
/// # Errors
///
/// Returns an error if the session is unknown or is the last one.
pub fn run(config: &Config, session: &str) -> Result<()> {
    let store = open_store(config)?;
    let mut app = App::load(&store);

    let id = resolve_session(&app, Some(session))?;
    app.delete_session(&id)?;

    println!("Deleted session {id}");
    Ok(())
}
