//! Core types: messages, sessions, settings, prompt composition and the
//! application state that ties them together.

pub mod app;
pub mod message;
pub mod prompt;
pub mod session;
pub mod settings;

pub use app::{App, PendingSend, SendOutcome};
pub use message::{Message, Mode, Role};
pub use session::{Session, SessionStore};
pub use settings::{AppSettings, SettingsStore, WritingSettings};
