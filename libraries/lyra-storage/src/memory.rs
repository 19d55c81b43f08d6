//! In-memory key-value store

use lyra_core::KeyValueStore;
use std::collections::HashMap;

use crate::{entry_size, full_key, StorageError, STORAGE_PREFIX};

/// `HashMap`-backed store
///
/// Used by tests and by hosts that persist elsewhere. An optional quota
/// mimics the browser's storage limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store without a quota
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes beyond `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Approximate bytes used by this app's entries
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with(STORAGE_PREFIX))
            .map(|(k, v)| entry_size(k, v))
            .sum()
    }

    /// Remove every entry written with the app prefix
    pub fn clear_all(&mut self) {
        self.entries.retain(|k, _| !k.starts_with(STORAGE_PREFIX));
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a raw entry under an unprefixed key (foreign data)
    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> lyra_core::Result<Option<String>> {
        let key = full_key(key)?;
        Ok(self.entries.get(&key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> lyra_core::Result<()> {
        let key = full_key(key)?;

        if let Some(quota) = self.quota_bytes {
            let current = self.entries.get(&key).map_or(0, |v| entry_size(&key, v));
            let projected = self.used_bytes() - current + entry_size(&key, value);
            if projected > quota {
                return Err(StorageError::QuotaExceeded.into());
            }
        }

        self.entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> lyra_core::Result<()> {
        let key = full_key(key)?;
        self.entries.remove(&key);
        Ok(())
    }
}
