//! Storage backends for sessions and settings.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use traits::{KeyValueStore, SESSIONS_KEY, SETTINGS_KEY};
