//! Namespaced TTL cache over the persistent store

use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::store::StorageBackend;

/// Key for the full-depth navigation outline
pub const OUTLINE_KEY: &str = "outline";

/// Key for the depth-1 outline shown on the home page
pub const OUTLINE_TOPLEVEL_KEY: &str = "outline-toplevel";

/// A cached payload with its write time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,

    /// Epoch milliseconds when the entry was written
    pub timestamp: i64,
}

/// Document and outline cache, namespaced per user identity.
///
/// Every key is prefixed by the current identity namespace (`user:{id}:` or
/// empty for anonymous). Entries older than the configured TTL are never
/// served; they are deleted on read. A malformed entry is treated as a miss,
/// not as an error.
pub struct DocCache {
    config: CacheConfig,
    store: Arc<dyn StorageBackend>,
    prefix: RwLock<String>,
}

impl DocCache {
    /// Create a cache over the given store, anonymous namespace
    pub fn new(config: CacheConfig, store: Arc<dyn StorageBackend>) -> Self {
        Self {
            config,
            store,
            prefix: RwLock::new(String::new()),
        }
    }

    /// Cache key for a document path
    pub fn doc_key(path: &str) -> String {
        format!("doc:{}", path.trim_start_matches('/'))
    }

    /// Switch the identity namespace. `user:{id}:` when logged in, empty
    /// when anonymous.
    pub fn set_prefix(&self, prefix: String) {
        if let Ok(mut current) = self.prefix.write() {
            *current = prefix;
        }
    }

    /// Current identity namespace
    pub fn prefix(&self) -> String {
        self.prefix.read().map(|p| p.clone()).unwrap_or_default()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }

    /// Read an entry, returning the payload only while it is younger than
    /// the TTL. Expired and unparseable entries are removed and reported as
    /// misses.
    pub fn read_fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        let full_key = self.full_key(key);
        let raw = self.store.get_item(&full_key)?;

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                // Corrupted entries fall through to a full fetch
                warn!(key = %full_key, %err, "discarding malformed cache entry");
                self.store.remove_item(&full_key);
                return None;
            }
        };

        let age = Utc::now().timestamp_millis() - entry.timestamp;
        if age > self.config.ttl_ms() {
            debug!(key = %full_key, age_ms = age, "cache entry expired");
            self.store.remove_item(&full_key);
            return None;
        }

        debug!(key = %full_key, age_ms = age, "cache hit");
        Some(entry.data)
    }

    /// Write an entry stamped with the current time
    pub fn write<T: Serialize>(&self, key: &str, data: &T) {
        if !self.config.enabled {
            return;
        }
        let entry = CacheEntry {
            data,
            timestamp: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => self.store.set_item(&self.full_key(key), &raw),
            Err(err) => warn!(key, %err, "failed to serialize cache entry"),
        }
    }

    /// Remove a single entry
    pub fn invalidate(&self, key: &str) {
        self.store.remove_item(&self.full_key(key));
    }

    /// Remove both outline entries; the navigation tree changed shape
    pub fn invalidate_outlines(&self) {
        self.invalidate(OUTLINE_KEY);
        self.invalidate(OUTLINE_TOPLEVEL_KEY);
    }

    /// Remove every entry under any user namespace. Called on logout so a
    /// departing identity's documents cannot leak to the next one.
    pub fn purge_user_namespaces(&self) -> usize {
        let removed = self.store.remove_prefix("user:");
        debug!(removed, "purged user-namespaced cache entries");
        removed
    }
}
