//! Typed load/save on top of [`KeyValueStore`]
//!
//! Loading never fails: a missing key, an unreadable backend or a corrupted
//! entry all yield the caller's default. Corrupted entries are removed so the
//! next save starts clean.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::KeyValueStore;

/// Load a JSON value, falling back to `default`
pub fn load_or<S, T>(store: &mut S, key: &str, default: T) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored value, using default");
            return default;
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value, using default");
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Stored value is corrupted, removing it");
            if let Err(e) = store.remove(key) {
                warn!(key, error = %e, "Failed to remove corrupted value");
            }
            default
        }
    }
}

/// Serialize and store a value
pub fn save<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
