//! Error types for inkmind.

use std::io;
use thiserror::Error;

/// Result type alias for inkmind operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in inkmind operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage I/O error.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Session not found.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// User input rejected. The message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    /// A completion request is already in flight.
    #[error("A request is already in progress")]
    Busy,

    /// The completion API answered with an error.
    #[error("Completion failed: {0}")]
    Completion(String),

    /// The completion API answered without any text.
    #[error("Completion returned no text")]
    EmptyCompletion,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Line editor error in the interactive chat.
    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl Error {
    /// Whether this error is a user-facing validation notice rather than a failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Busy)
    }
}
