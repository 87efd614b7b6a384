//! Language-model clients.

pub mod gemini;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::{CompletionClient, CompletionRequest, GenerationParams, Turn, TurnRole};
