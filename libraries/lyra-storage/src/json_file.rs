//! JSON-file-backed key-value store
//!
//! The whole store is a single JSON object on disk. Every write rewrites the
//! file through a temporary sibling and a rename, so a crash mid-write never
//! leaves a half-written store behind.

use lyra_core::KeyValueStore;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{full_key, Result, StorageError, STORAGE_PREFIX};

/// File-backed store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) a store at `path`
    ///
    /// A missing file yields an empty store. A corrupted file is logged and
    /// treated as empty; it is overwritten by the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Store file is corrupted, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Store file does not exist yet");
                BTreeMap::new()
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        Ok(Self { path, entries })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove every entry written with the app prefix
    pub fn clear_all(&mut self) -> Result<()> {
        self.entries.retain(|k, _| !k.starts_with(STORAGE_PREFIX));
        self.flush()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(&self.entries)?;
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> lyra_core::Result<Option<String>> {
        let key = full_key(key)?;
        Ok(self.entries.get(&key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> lyra_core::Result<()> {
        let key = full_key(key)?;
        let previous = self.entries.insert(key.clone(), value.to_string());

        if let Err(e) = self.flush() {
            // Keep memory and disk in agreement
            match previous {
                Some(previous) => self.entries.insert(key, previous),
                None => self.entries.remove(&key),
            };
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> lyra_core::Result<()> {
        let key = full_key(key)?;
        if self.entries.remove(&key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
