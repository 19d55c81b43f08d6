//! In-memory track library
//!
//! Insertion-ordered, shareable behind an `Arc`, and usable as the
//! [`TrackLibrary`] collaborator of the playback manager.

use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::TrackLibrary;
use crate::types::{TrackId, TrackMetadata};

#[derive(Debug, Default)]
struct Inner {
    order: Vec<TrackId>,
    tracks: HashMap<TrackId, TrackMetadata>,
}

/// Thread-safe in-memory library
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    inner: RwLock<Inner>,
}

impl MemoryLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library from a list of tracks
    pub fn from_tracks(tracks: impl IntoIterator<Item = TrackMetadata>) -> Self {
        let library = Self::new();
        for track in tracks {
            library.insert(track);
        }
        library
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a track
    ///
    /// Replacing keeps the track's original position.
    pub fn insert(&self, track: TrackMetadata) {
        let mut inner = self.write();
        if !inner.tracks.contains_key(&track.id) {
            inner.order.push(track.id.clone());
        }
        inner.tracks.insert(track.id.clone(), track);
    }

    /// Remove a track, returning its metadata
    pub fn remove(&self, id: &TrackId) -> Option<TrackMetadata> {
        let mut inner = self.write();
        let removed = inner.tracks.remove(id)?;
        inner.order.retain(|t| t != id);
        Some(removed)
    }

    /// All track ids in insertion order
    pub fn ids(&self) -> Vec<TrackId> {
        self.read().order.clone()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    /// Check if the library is empty
    pub fn is_empty(&self) -> bool {
        self.read().order.is_empty()
    }

    /// Ids of tracks by an artist, in insertion order
    pub fn tracks_by_artist(&self, artist: &str) -> Vec<TrackId> {
        self.filter_ids(|t| t.artist.as_deref() == Some(artist))
    }

    /// Ids of tracks on an album, in insertion order
    pub fn tracks_by_album(&self, album: &str) -> Vec<TrackId> {
        self.filter_ids(|t| t.album.as_deref() == Some(album))
    }

    /// Distinct artist names, sorted
    pub fn artists(&self) -> Vec<String> {
        self.distinct(|t| t.artist.as_deref())
    }

    /// Distinct album names, sorted
    pub fn albums(&self) -> Vec<String> {
        self.distinct(|t| t.album.as_deref())
    }

    /// Ids of liked tracks, in insertion order
    pub fn liked(&self) -> Vec<TrackId> {
        self.filter_ids(|t| t.liked)
    }

    fn distinct(&self, field: impl Fn(&TrackMetadata) -> Option<&str>) -> Vec<String> {
        let inner = self.read();
        inner
            .tracks
            .values()
            .filter_map(&field)
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn filter_ids(&self, predicate: impl Fn(&TrackMetadata) -> bool) -> Vec<TrackId> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter(|id| inner.tracks.get(*id).is_some_and(&predicate))
            .cloned()
            .collect()
    }
}

impl TrackLibrary for MemoryLibrary {
    fn track(&self, id: &TrackId) -> Option<TrackMetadata> {
        self.read().tracks.get(id).cloned()
    }

    fn contains(&self, id: &TrackId) -> bool {
        self.read().tracks.contains_key(id)
    }

    fn mark_played(&self, id: &TrackId) {
        if let Some(track) = self.write().tracks.get_mut(id) {
            track.last_played_at = Some(Utc::now());
        }
    }

    fn find_by_tags(&self, title: &str, artist: Option<&str>, album: Option<&str>) -> Option<TrackId> {
        let inner = self.read();
        inner
            .order
            .iter()
            .find(|id| {
                inner.tracks.get(*id).is_some_and(|t| {
                    t.title == title && t.artist.as_deref() == artist && t.album.as_deref() == album
                })
            })
            .cloned()
    }

    fn toggle_like(&self, id: &TrackId) -> Option<bool> {
        let mut inner = self.write();
        let track = inner.tracks.get_mut(id)?;
        track.liked = !track.liked;
        Some(track.liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceHandle;

    fn track(id: &str, artist: &str, album: &str) -> TrackMetadata {
        TrackMetadata::new(id, format!("Song {id}"), 180.0, SourceHandle::Blob(id.to_string()))
            .with_artist(artist)
            .with_album(album)
    }

    #[test]
    fn insert_keeps_order_and_replaces_in_place() {
        let library = MemoryLibrary::new();
        library.insert(track("a", "X", "One"));
        library.insert(track("b", "Y", "Two"));
        library.insert(track("a", "Z", "One"));

        assert_eq!(library.ids(), vec![TrackId::new("a"), TrackId::new("b")]);
        assert_eq!(
            library.track(&TrackId::new("a")).unwrap().artist.as_deref(),
            Some("Z")
        );
    }

    #[test]
    fn remove_drops_from_lookup_and_order() {
        let library = MemoryLibrary::from_tracks([track("a", "X", "One"), track("b", "X", "One")]);
        let removed = library.remove(&TrackId::new("a")).unwrap();

        assert_eq!(removed.id, TrackId::new("a"));
        assert!(!library.contains(&TrackId::new("a")));
        assert_eq!(library.len(), 1);
        assert!(library.remove(&TrackId::new("a")).is_none());
    }

    #[test]
    fn grouping_by_artist_and_album() {
        let library = MemoryLibrary::from_tracks([
            track("a", "X", "One"),
            track("b", "Y", "One"),
            track("c", "X", "Two"),
        ]);

        assert_eq!(
            library.tracks_by_artist("X"),
            vec![TrackId::new("a"), TrackId::new("c")]
        );
        assert_eq!(
            library.tracks_by_album("One"),
            vec![TrackId::new("a"), TrackId::new("b")]
        );
    }

    #[test]
    fn distinct_artists_and_albums_are_sorted() {
        let library = MemoryLibrary::from_tracks([
            track("a", "Yann", "Two"),
            track("b", "Xia", "One"),
            track("c", "Yann", "One"),
            TrackMetadata::new("d", "Loose", 10.0, SourceHandle::Blob("d".into())),
        ]);

        assert_eq!(library.artists(), vec!["Xia", "Yann"]);
        assert_eq!(library.albums(), vec!["One", "Two"]);
    }

    #[test]
    fn find_by_tags_needs_every_tag_to_match() {
        let library = MemoryLibrary::from_tracks([
            track("a", "X", "One"),
            TrackMetadata::new("b", "Song b", 10.0, SourceHandle::Blob("b".into())),
        ]);

        assert_eq!(
            library.find_by_tags("Song a", Some("X"), Some("One")),
            Some(TrackId::new("a"))
        );
        assert_eq!(library.find_by_tags("Song a", Some("X"), None), None);
        assert_eq!(
            library.find_by_tags("Song b", None, None),
            Some(TrackId::new("b"))
        );
    }

    #[test]
    fn toggle_like_and_mark_played() {
        let library = MemoryLibrary::from_tracks([track("a", "X", "One")]);
        let id = TrackId::new("a");

        assert_eq!(library.toggle_like(&id), Some(true));
        assert_eq!(library.liked(), vec![id.clone()]);
        assert_eq!(library.toggle_like(&id), Some(false));
        assert_eq!(library.toggle_like(&TrackId::new("missing")), None);

        assert!(library.track(&id).unwrap().last_played_at.is_none());
        library.mark_played(&id);
        assert!(library.track(&id).unwrap().last_played_at.is_some());
    }

    #[test]
    fn duration_comes_from_metadata() {
        let library = MemoryLibrary::from_tracks([track("a", "X", "One")]);
        assert_eq!(library.duration_secs(&TrackId::new("a")), Some(180.0));
        assert_eq!(library.duration_secs(&TrackId::new("b")), None);
    }
}
