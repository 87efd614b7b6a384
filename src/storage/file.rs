//! File-based storage backend.

use crate::error::Result;
use crate::storage::traits::KeyValueStore;
use std::fs;
use std::path::PathBuf;

/// File-based storage backend with atomic writes.
///
/// Each key lives in its own `<key>.json` file under `<base_dir>/store`.
#[derive(Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a new file backend.
    ///
    /// Creates the store directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be created.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(base_dir.join("store"))?;
        Ok(Self { base_dir })
    }

    /// Get the path to the file holding a key.
    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join("store").join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let temp = path.with_extension("tmp");

        fs::write(&temp, value)?;
        // Readers see either the old document or the new one, never a partial write.
        fs::rename(&temp, &path)?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Get the default inkmind home directory.
///
/// Uses `INKMIND_HOME` environment variable if set, otherwise `~/.inkmind`.
#[must_use]
pub fn get_inkmind_home() -> PathBuf {
    if let Ok(home) = std::env::var("INKMIND_HOME") {
        PathBuf::from(home)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".inkmind")
    } else {
        PathBuf::from(".inkmind")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::{SESSIONS_KEY, SETTINGS_KEY};
    use tempfile::TempDir;

    fn create_test_backend() -> (FileBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
        (backend, temp_dir)
    }

    #[test]
    fn creates_store_directory() {
        let temp_dir = TempDir::new().unwrap();
        let _backend = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(temp_dir.path().join("store").exists());
    }

    #[test]
    fn get_missing_key() {
        let (store, _temp) = create_test_backend();
        assert!(store.get(SESSIONS_KEY).unwrap().is_none());
    }

    #[test]
    fn put_and_get() {
        let (store, _temp) = create_test_backend();
        store.put(SETTINGS_KEY, r#"{"theme":"dark"}"#).unwrap();

        let value = store.get(SETTINGS_KEY).unwrap().unwrap();
        assert_eq!(value, r#"{"theme":"dark"}"#);
    }

    #[test]
    fn put_overwrites_previous_value() {
        let (store, _temp) = create_test_backend();
        store.put(SESSIONS_KEY, "[1]").unwrap();
        store.put(SESSIONS_KEY, "[1,2]").unwrap();

        assert_eq!(store.get(SESSIONS_KEY).unwrap().unwrap(), "[1,2]");
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let (store, temp_dir) = create_test_backend();
        store.put(SESSIONS_KEY, "[]").unwrap();

        let dir = temp_dir.path().join("store");
        assert!(!dir.join(format!("{SESSIONS_KEY}.tmp")).exists());
        assert!(dir.join(format!("{SESSIONS_KEY}.json")).exists());
    }

    #[test]
    fn keys_are_stored_independently() {
        let (store, _temp) = create_test_backend();
        store.put(SESSIONS_KEY, "sessions").unwrap();
        store.put(SETTINGS_KEY, "settings").unwrap();

        assert_eq!(store.get(SESSIONS_KEY).unwrap().unwrap(), "sessions");
        assert_eq!(store.get(SETTINGS_KEY).unwrap().unwrap(), "settings");
    }

    #[test]
    fn delete_removes_file() {
        let (store, temp_dir) = create_test_backend();
        store.put(SETTINGS_KEY, "{}").unwrap();

        let path = temp_dir
            .path()
            .join("store")
            .join(format!("{SETTINGS_KEY}.json"));
        assert!(path.exists());

        store.delete(SETTINGS_KEY).unwrap();
        assert!(!path.exists());
        assert!(store.get(SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn delete_missing_key_succeeds() {
        let (store, _temp) = create_test_backend();
        store.delete("nonexistent").unwrap();
    }

    #[test]
    fn values_survive_reopening() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
            store.put(SESSIONS_KEY, "[\"persisted\"]").unwrap();
        }

        let reopened = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened.get(SESSIONS_KEY).unwrap().unwrap(),
            "[\"persisted\"]"
        );
    }
}
