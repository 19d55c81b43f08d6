//! Browser `localStorage` backend

use lyra_core::KeyValueStore;
use web_sys::Storage;

use crate::{full_key, Result, StorageError, STORAGE_PREFIX};

/// Store backed by the window's `localStorage`
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Attach to the current window's `localStorage`
    pub fn new() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }

    /// Remove every entry written with the app prefix
    pub fn clear_all(&mut self) -> Result<()> {
        let len = self
            .storage
            .length()
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?;

        let keys: Vec<String> = (0..len)
            .filter_map(|i| self.storage.key(i).ok().flatten())
            .filter(|k| k.starts_with(STORAGE_PREFIX))
            .collect();

        for key in keys {
            self.storage
                .remove_item(&key)
                .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?;
        }
        Ok(())
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> lyra_core::Result<Option<String>> {
        let key = full_key(key)?;
        self.storage
            .get_item(&key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")).into())
    }

    fn set(&mut self, key: &str, value: &str) -> lyra_core::Result<()> {
        let key = full_key(key)?;
        // setItem only throws when the quota is exhausted or storage is blocked
        self.storage
            .set_item(&key, value)
            .map_err(|_| StorageError::QuotaExceeded.into())
    }

    fn remove(&mut self, key: &str) -> lyra_core::Result<()> {
        let key = full_key(key)?;
        self.storage
            .remove_item(&key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")).into())
    }
}
