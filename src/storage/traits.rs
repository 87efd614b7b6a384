//! Storage trait definitions.

use crate::error::Result;

/// Key under which the serialized session collection is stored.
pub const SESSIONS_KEY: &str = "ink_and_mind_sessions_v2";

/// Key under which the serialized settings document is stored.
pub const SETTINGS_KEY: &str = "ink_and_mind_settings_v1";

/// String-valued key-value storage backend.
///
/// Values are opaque to the backend; callers store JSON documents.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete(&self, key: &str) -> Result<()>;
}
