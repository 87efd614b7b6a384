//! `inkmind send` command implementation.

use crate::cli::{open_store, print_message, resolve_session};
use crate::client::{CompletionClient, GeminiClient};
use crate::config::Config;
use crate::core::{App, Mode, SendOutcome};
use crate::error::Result;

/// Run the send command.
///
/// Appends the prompt to the session, waits for the reply and prints it.
///
/// # Errors
///
/// Returns an error if the session is unknown, the prompt is blank, or no
/// API key is configured. A failed completion is not an error: the fallback
/// notice is recorded and printed instead.
pub fn run(config: &Config, session: Option<&str>, mode: Mode, text: &str) -> Result<()> {
    let client = GeminiClient::from_config(&config.api)?;
    let store = open_store(config)?;
    let mut app = App::load(&store);

    let id = resolve_session(&app, session)?;
    app.select_session(&id);
    app.set_mode(mode);

    let outcome = send_and_report(&mut app, text, &client)?;
    if let Some(message) = outcome.message() {
        print_message(message);
    }
    Ok(())
}

/// Send through `client` and log the outcome.
///
/// # Errors
///
/// Returns the validation errors of [`App::send`].
pub fn send_and_report(
    app: &mut App<'_>,
    text: &str,
    client: &dyn CompletionClient,
) -> Result<SendOutcome> {
    let outcome = app.send(text, client)?;
    match &outcome {
        SendOutcome::Replied(m) => {
            tracing::info!(words = m.word_count.unwrap_or(0), "reply recorded");
        }
        SendOutcome::Fallback(_) => tracing::info!("fallback notice recorded"),
        SendOutcome::Discarded(_) => tracing::info!("reply discarded"),
    }
    Ok(outcome)
}
