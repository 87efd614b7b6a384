//! `inkmind compile` command implementation.

use crate::cli::{open_store, resolve_session};
use crate::client::GeminiClient;
use crate::config::Config;
use crate::core::App;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Run the compile command.
///
/// Asks the model to edit the whole conversation into one manuscript and
/// prints it, or writes it to `output`.
///
/// # Errors
///
/// Returns an error if the session is unknown, no API key is configured, the
/// completion fails, or the file cannot be written.
pub fn run(config: &Config, session: Option<&str>, output: Option<&Path>) -> Result<()> {
    let client = GeminiClient::from_config(&config.api)?;
    let store = open_store(config)?;
    let app = App::load(&store);

    let id = resolve_session(&app, session)?;
    tracing::info!(session = %id, model = client.model(), "compiling manuscript");
    let manuscript = app.compile(&id, &client)?;

    match output {
        Some(path) => {
            fs::write(path, &manuscript)?;
            println!("Wrote manuscript to {}", path.display());
        }
        None => println!("{manuscript}"),
    }
    Ok(())
}
