//! Lyra Storage
//!
//! Key-value persistence backends implementing [`lyra_core::KeyValueStore`].
//!
//! Every backend namespaces keys with [`STORAGE_PREFIX`] so several apps can
//! share one underlying store, and `clear_all` only touches this app's keys.
//!
//! # Example
//!
//! ```rust
//! use lyra_core::{load_or, save};
//! use lyra_storage::{MemoryStore, KEY_PLAYER_STATE};
//!
//! let mut store = MemoryStore::new();
//! save(&mut store, KEY_PLAYER_STATE, &vec!["a", "b"]).unwrap();
//!
//! let queue: Vec<String> = load_or(&mut store, KEY_PLAYER_STATE, Vec::new());
//! assert_eq!(queue, vec!["a", "b"]);
//! ```

mod error;
mod json_file;
mod memory;

#[cfg(feature = "wasm")]
mod local_storage;

pub use error::{Result, StorageError};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[cfg(feature = "wasm")]
pub use local_storage::LocalStorageStore;

/// Prefix applied to every key written by Lyra
pub const STORAGE_PREFIX: &str = "music-player:";

/// Player preferences and queue
pub const KEY_PLAYER_STATE: &str = "player-state";

/// User playlists
pub const KEY_PLAYLISTS: &str = "playlists";

/// Library metadata
pub const KEY_LIBRARY: &str = "music-library";

/// Build the namespaced key for a logical key
pub(crate) fn full_key(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(StorageError::EmptyKey);
    }
    Ok(format!("{STORAGE_PREFIX}{key}"))
}

/// Approximate bytes used by one entry (UTF-16, as browsers count it)
pub(crate) fn entry_size(full_key: &str, value: &str) -> usize {
    (full_key.chars().count() + value.chars().count()) * 2
}
