/// Collaborator traits consumed by the playback core
use crate::error::Result;
use crate::types::{TrackId, TrackMetadata};

/// Library lookup
///
/// The playback orchestrator resolves playable sources and durations through
/// this trait instead of reaching into a global library store. Implementers
/// own the metadata; callers only hold ids.
pub trait TrackLibrary: Send + Sync {
    /// Look up a track by id
    fn track(&self, id: &TrackId) -> Option<TrackMetadata>;

    /// Duration of a track in seconds
    fn duration_secs(&self, id: &TrackId) -> Option<f64> {
        self.track(id).map(|t| t.duration_secs)
    }

    /// Check whether a track exists
    fn contains(&self, id: &TrackId) -> bool {
        self.track(id).is_some()
    }

    /// Record that playback of a track started
    fn mark_played(&self, id: &TrackId) {
        let _ = id;
    }

    /// Find a track by its tags
    ///
    /// Used to match tracks from another library. Returns the first track
    /// whose title, artist and album all equal the given ones.
    fn find_by_tags(&self, title: &str, artist: Option<&str>, album: Option<&str>) -> Option<TrackId> {
        let _ = (title, artist, album);
        None
    }

    /// Flip the liked flag of a track
    ///
    /// Returns the new flag, or `None` if the track does not exist or the
    /// library does not support favourites.
    fn toggle_like(&self, id: &TrackId) -> Option<bool> {
        let _ = id;
        None
    }
}

/// Key-value persistence
///
/// Values are JSON text. Keys are logical names; backends may namespace them.
pub trait KeyValueStore {
    /// Read a raw value
    ///
    /// Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a key (absent keys are not an error)
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
