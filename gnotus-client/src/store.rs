//! Persistent key-value storage, the localStorage analog

use std::collections::HashMap;
use std::sync::RwLock;

/// Synchronous string key-value store.
///
/// Mirrors the browser localStorage contract: synchronous access, string
/// keys and values, no cross-process coordination. Implementations must not
/// fail loudly; a broken store behaves as empty.
pub trait StorageBackend: Send + Sync {
    /// Read a value, `None` when absent
    fn get_item(&self, key: &str) -> Option<String>;

    /// Write a value, overwriting any previous one
    fn set_item(&self, key: &str, value: &str);

    /// Remove a key; removing an absent key is a no-op
    fn remove_item(&self, key: &str);

    /// Remove every key starting with `prefix`, returning how many were removed
    fn remove_prefix(&self, prefix: &str) -> usize;
}

/// In-memory store backed by a `HashMap`
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove_item(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    fn remove_prefix(&self, prefix: &str) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &keys {
            entries.remove(key);
        }
        keys.len()
    }
}
