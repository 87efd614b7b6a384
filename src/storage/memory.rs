//! In-memory storage backend for testing.

use crate::error::Result;
use crate::storage::traits::KeyValueStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage backend for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend
            .entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        backend
    }
}

impl KeyValueStore for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key() {
        let store = MemoryBackend::new();
        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn put_and_get() {
        let store = MemoryBackend::new();
        store.put("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().unwrap(), "value");
    }

    #[test]
    fn with_entry_seeds_value() {
        let store = MemoryBackend::with_entry("key", "seeded");
        assert_eq!(store.get("key").unwrap().unwrap(), "seeded");
    }

    #[test]
    fn delete_removes_entry() {
        let store = MemoryBackend::new();
        store.put("key", "value").unwrap();
        store.delete("key").unwrap();
        assert!(store.get("key").unwrap().is_none());
    }

    #[test]
    fn delete_missing_key_succeeds() {
        let store = MemoryBackend::new();
        store.delete("nonexistent").unwrap();
    }

    #[test]
    fn concurrent_read_write() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryBackend::new());
        store.put("shared", "initial").unwrap();

        let mut handles = vec![];
        for i in 0..5 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..20 {
                    store_clone.put(&format!("key-{i}-{j}"), "v").unwrap();
                    assert!(store_clone.get("shared").unwrap().is_some());
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(store.entries.read().unwrap().len(), 101);
    }
}
