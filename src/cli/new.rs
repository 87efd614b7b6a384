//! `inkmind new` command implementation.

use crate::cli::open_store;
use crate::config::Config;
use crate::core::App;
use crate::error::Result;

/// Run the new command.
///
/// Creates an empty session and prints its ID.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn run(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let mut app = App::load(&store);

    let id = app.create_session();
    println!("Created session {id}");
    Ok(())
}
