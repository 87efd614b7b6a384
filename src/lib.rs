//! inkmind - AI-assisted fiction writing in the terminal.
//!
//! Keeps multiple writing sessions on disk, sends prompts with per-user style
//! settings to a hosted language model, and assembles selected passages into
//! a manuscript.

pub mod analytics;
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod logging;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
