//! `inkmind rename` command implementation.

use crate::cli::{open_store, resolve_session};
use crate::config::Config;
use crate::core::App;
use crate::error::Result;

/// Run the rename command.
///
/// # Errors
///
/// Returns an error if the session is unknown or the title is blank.
pub fn run(config: &Config, session: Option<&str>, title: &str) -> Result<()> {
    let store = open_store(config)?;
    let mut app = App::load(&store);

    let id = resolve_session(&app, session)?;
    app.rename_session(&id, title)?;

    println!("Renamed session {id} to \"{}\"", title.trim());
    Ok(())
}
