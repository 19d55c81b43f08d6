//! User playlists
//!
//! A playlist is a named, ordered list of track ids with no duplicates.
//! [`Playlists`] holds every playlist, persists as one JSON document and
//! moves playlists between users as a portable export that names tracks by
//! their tags instead of their ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::storage::{load_or, save};
use crate::traits::{KeyValueStore, TrackLibrary};
use crate::types::{PlaylistId, TrackId};

/// One user playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Display name (never empty)
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Tracks in play order, each at most once
    #[serde(default)]
    pub track_ids: Vec<TrackId>,

    /// When the playlist was created
    pub created_at: DateTime<Utc>,

    /// When the playlist last changed
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    fn new(name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: PlaylistId::generate(),
            name,
            description,
            track_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the playlist holds a track
    pub fn contains(&self, track: &TrackId) -> bool {
        self.track_ids.contains(track)
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    /// Check if the playlist has no tracks
    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Fields to change on a playlist; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistUpdate {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Portable playlist document
///
/// Tracks are described by their tags so another library can match them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistExport {
    /// Playlist name
    pub name: String,

    /// Playlist description
    #[serde(default)]
    pub description: String,

    /// When the exported playlist was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Tracks in play order
    pub music: Vec<ExportedTrack>,
}

/// Track entry of a [`PlaylistExport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedTrack {
    /// Track title
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: Option<String>,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
}

/// Outcome of [`Playlists::import`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// The playlist that was created
    pub playlist_id: PlaylistId,

    /// Tracks listed in the document
    pub total: usize,

    /// Tracks found in the library
    pub matched: usize,

    /// Tracks the library does not have
    pub unmatched: usize,
}

/// Every user playlist, in creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlists {
    #[serde(default)]
    playlists: Vec<Playlist>,
}

impl Playlists {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a store, falling back to an empty collection
    pub fn load<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Self {
        load_or(store, key, Self::default())
    }

    /// Write to a store
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, key: &str) -> Result<()> {
        save(store, key, self)
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// Check if there are no playlists
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Iterate in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.iter()
    }

    /// Look up a playlist by id
    pub fn get(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| &p.id == id)
    }

    /// Look up a playlist by id, or else by exact name
    pub fn find(&self, key: &str) -> Option<&Playlist> {
        self.playlists
            .iter()
            .find(|p| p.id.as_str() == key)
            .or_else(|| self.playlists.iter().find(|p| p.name == key))
    }

    /// Playlists holding a track
    pub fn containing(&self, track: &TrackId) -> Vec<&Playlist> {
        self.playlists.iter().filter(|p| p.contains(track)).collect()
    }

    /// Create an empty playlist
    ///
    /// Name and description are trimmed; a blank name is rejected.
    pub fn create(&mut self, name: &str, description: &str) -> Result<&Playlist> {
        let name = checked_name(name)?;
        let playlist = Playlist::new(name, description.trim().to_string());
        debug!(playlist_id = %playlist.id, name = %playlist.name, "Created playlist");

        let index = self.playlists.len();
        self.playlists.push(playlist);
        Ok(&self.playlists[index])
    }

    /// Delete a playlist, returning it
    pub fn delete(&mut self, id: &PlaylistId) -> Option<Playlist> {
        let index = self.playlists.iter().position(|p| &p.id == id)?;
        Some(self.playlists.remove(index))
    }

    /// Rename or re-describe a playlist
    pub fn update(&mut self, id: &PlaylistId, update: PlaylistUpdate) -> Result<()> {
        let name = update.name.as_deref().map(checked_name).transpose()?;
        let playlist = self.get_mut(id)?;

        if let Some(name) = name {
            playlist.name = name;
        }
        if let Some(description) = update.description {
            playlist.description = description.trim().to_string();
        }
        playlist.touch();
        Ok(())
    }

    /// Append a track
    ///
    /// Returns `false` when the playlist already holds it.
    pub fn add_track(&mut self, id: &PlaylistId, track: TrackId) -> Result<bool> {
        let playlist = self.get_mut(id)?;
        if playlist.contains(&track) {
            return Ok(false);
        }
        playlist.track_ids.push(track);
        playlist.touch();
        Ok(true)
    }

    /// Remove a track
    ///
    /// Returns `false` when the playlist did not hold it.
    pub fn remove_track(&mut self, id: &PlaylistId, track: &TrackId) -> Result<bool> {
        let playlist = self.get_mut(id)?;
        let Some(index) = playlist.track_ids.iter().position(|t| t == track) else {
            return Ok(false);
        };
        playlist.track_ids.remove(index);
        playlist.touch();
        Ok(true)
    }

    /// Move the track at `from` to `to`
    ///
    /// Out-of-range indices leave the playlist unchanged and return `false`.
    pub fn reorder(&mut self, id: &PlaylistId, from: usize, to: usize) -> Result<bool> {
        let playlist = self.get_mut(id)?;
        let len = playlist.track_ids.len();
        if from >= len || to >= len {
            return Ok(false);
        }
        let track = playlist.track_ids.remove(from);
        playlist.track_ids.insert(to, track);
        playlist.touch();
        Ok(true)
    }

    /// Remove a track from every playlist
    ///
    /// Returns how many playlists changed.
    pub fn forget_track(&mut self, track: &TrackId) -> usize {
        let mut changed = 0;
        for playlist in &mut self.playlists {
            let before = playlist.track_ids.len();
            playlist.track_ids.retain(|t| t != track);
            if playlist.track_ids.len() != before {
                playlist.touch();
                changed += 1;
            }
        }
        changed
    }

    /// Build the portable document for a playlist
    ///
    /// Tracks the library no longer has are left out.
    pub fn export<L: TrackLibrary + ?Sized>(
        &self,
        id: &PlaylistId,
        library: &L,
    ) -> Result<PlaylistExport> {
        let playlist = self
            .get(id)
            .ok_or_else(|| CoreError::PlaylistNotFound(id.clone()))?;

        let music = playlist
            .track_ids
            .iter()
            .filter_map(|track| library.track(track))
            .map(|track| ExportedTrack {
                title: track.title,
                artist: track.artist,
                album: track.album,
                duration: track.duration_secs,
            })
            .collect();

        Ok(PlaylistExport {
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            created_at: Some(playlist.created_at),
            music,
        })
    }

    /// Export a playlist as pretty-printed JSON
    pub fn export_json<L: TrackLibrary + ?Sized>(
        &self,
        id: &PlaylistId,
        library: &L,
    ) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export(id, library)?)?)
    }

    /// Create a playlist from an exported JSON document
    ///
    /// Each listed track is matched against the library by title, artist
    /// and album; unmatched tracks are counted and skipped.
    pub fn import<L: TrackLibrary + ?Sized>(
        &mut self,
        json: &str,
        library: &L,
    ) -> Result<ImportReport> {
        let document: PlaylistExport = serde_json::from_str(json)
            .map_err(|e| CoreError::invalid_input(format!("invalid playlist file: {e}")))?;

        let playlist_id = self.create(&document.name, &document.description)?.id.clone();

        let mut matched = 0;
        for entry in &document.music {
            let found = library.find_by_tags(
                &entry.title,
                entry.artist.as_deref(),
                entry.album.as_deref(),
            );
            if let Some(track) = found {
                self.add_track(&playlist_id, track)?;
                matched += 1;
            }
        }

        let total = document.music.len();
        debug!(%playlist_id, total, matched, "Imported playlist");
        Ok(ImportReport {
            playlist_id,
            total,
            matched,
            unmatched: total - matched,
        })
    }

    fn get_mut(&mut self, id: &PlaylistId) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::PlaylistNotFound(id.clone()))
    }
}

fn checked_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::invalid_input("playlist name must not be empty"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryLibrary;
    use crate::types::{SourceHandle, TrackMetadata};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore(HashMap<String, String>);

    impl KeyValueStore for MapStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.0.remove(key);
            Ok(())
        }
    }

    fn tid(id: &str) -> TrackId {
        TrackId::new(id)
    }

    fn library() -> MemoryLibrary {
        MemoryLibrary::from_tracks([
            TrackMetadata::new("a", "Intro", 60.0, SourceHandle::Blob("a".into()))
                .with_artist("X")
                .with_album("One"),
            TrackMetadata::new("b", "Outro", 90.0, SourceHandle::Blob("b".into()))
                .with_artist("Y"),
        ])
    }

    fn with_playlist(tracks: &[&str]) -> (Playlists, PlaylistId) {
        let mut playlists = Playlists::new();
        let id = playlists.create("Mix", "").unwrap().id.clone();
        for track in tracks {
            playlists.add_track(&id, tid(track)).unwrap();
        }
        (playlists, id)
    }

    #[test]
    fn create_trims_and_rejects_blank_names() {
        let mut playlists = Playlists::new();
        let created = playlists.create("  Road trip ", " summer ").unwrap();
        assert_eq!(created.name, "Road trip");
        assert_eq!(created.description, "summer");
        assert!(created.is_empty());

        assert!(matches!(
            playlists.create("   ", ""),
            Err(CoreError::InvalidInput(_))
        ));
        assert_eq!(playlists.len(), 1);
    }

    #[test]
    fn add_skips_duplicates() {
        let (mut playlists, id) = with_playlist(&["a"]);

        assert!(!playlists.add_track(&id, tid("a")).unwrap());
        assert!(playlists.add_track(&id, tid("b")).unwrap());
        assert_eq!(playlists.get(&id).unwrap().track_ids, vec![tid("a"), tid("b")]);
    }

    #[test]
    fn unknown_playlist_is_an_error() {
        let mut playlists = Playlists::new();
        let missing = PlaylistId::new("nope");

        assert!(matches!(
            playlists.add_track(&missing, tid("a")),
            Err(CoreError::PlaylistNotFound(_))
        ));
        assert!(playlists.delete(&missing).is_none());
    }

    #[test]
    fn update_changes_only_given_fields() {
        let (mut playlists, id) = with_playlist(&[]);
        let before = playlists.get(&id).unwrap().updated_at;

        playlists
            .update(
                &id,
                PlaylistUpdate {
                    description: Some("late night".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let playlist = playlists.get(&id).unwrap();
        assert_eq!(playlist.name, "Mix");
        assert_eq!(playlist.description, "late night");
        assert!(playlist.updated_at >= before);

        let blank = PlaylistUpdate {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(playlists.update(&id, blank).is_err());
        assert_eq!(playlists.get(&id).unwrap().name, "Mix");
    }

    #[test]
    fn reorder_moves_and_ignores_bad_indices() {
        let (mut playlists, id) = with_playlist(&["a", "b", "c"]);

        assert!(playlists.reorder(&id, 0, 2).unwrap());
        assert_eq!(
            playlists.get(&id).unwrap().track_ids,
            vec![tid("b"), tid("c"), tid("a")]
        );

        assert!(!playlists.reorder(&id, 3, 0).unwrap());
        assert!(!playlists.reorder(&id, 0, 3).unwrap());
        assert_eq!(playlists.get(&id).unwrap().len(), 3);
    }

    #[test]
    fn forget_track_cascades_to_every_playlist() {
        let (mut playlists, first) = with_playlist(&["a", "b"]);
        let second = playlists.create("Other", "").unwrap().id.clone();
        playlists.add_track(&second, tid("a")).unwrap();
        let third = playlists.create("Untouched", "").unwrap().id.clone();
        playlists.add_track(&third, tid("b")).unwrap();

        assert_eq!(playlists.containing(&tid("a")).len(), 2);
        assert_eq!(playlists.forget_track(&tid("a")), 2);

        assert!(playlists.containing(&tid("a")).is_empty());
        assert_eq!(playlists.get(&first).unwrap().track_ids, vec![tid("b")]);
        assert!(playlists.get(&second).unwrap().is_empty());
        assert_eq!(playlists.get(&third).unwrap().track_ids, vec![tid("b")]);
    }

    #[test]
    fn find_by_id_or_name() {
        let (playlists, id) = with_playlist(&[]);
        assert_eq!(playlists.find("Mix").map(|p| &p.id), Some(&id));
        assert_eq!(playlists.find(id.as_str()).map(|p| &p.id), Some(&id));
        assert!(playlists.find("mix").is_none());
    }

    #[test]
    fn persists_under_playlists_document() {
        let (playlists, id) = with_playlist(&["a"]);
        let mut store = MapStore::default();
        playlists.save(&mut store, "playlists").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.get("playlists").unwrap().unwrap()).unwrap();
        assert_eq!(raw["playlists"][0]["trackIds"], serde_json::json!(["a"]));

        let loaded = Playlists::load(&mut store, "playlists");
        assert_eq!(loaded.get(&id).unwrap().track_ids, vec![tid("a")]);
    }

    #[test]
    fn corrupt_document_loads_empty() {
        let mut store = MapStore::default();
        store.set("playlists", "[1, 2").unwrap();
        assert!(Playlists::load(&mut store, "playlists").is_empty());
    }

    #[test]
    fn export_skips_missing_tracks() {
        let (playlists, id) = with_playlist(&["a", "gone", "b"]);
        let export = playlists.export(&id, &library()).unwrap();

        assert_eq!(export.name, "Mix");
        let titles: Vec<_> = export.music.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Outro"]);
        assert_eq!(export.music[0].album.as_deref(), Some("One"));
    }

    #[test]
    fn import_matches_by_tags() {
        let json = r#"{
            "name": "Shared",
            "music": [
                {"title": "Intro", "artist": "X", "album": "One", "duration": 60},
                {"title": "Outro", "artist": "Y"},
                {"title": "Intro", "artist": "Someone else", "album": "One"}
            ]
        }"#;

        let mut playlists = Playlists::new();
        let report = playlists.import(json, &library()).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.matched, 2);
        assert_eq!(report.unmatched, 1);
        let imported = playlists.get(&report.playlist_id).unwrap();
        assert_eq!(imported.name, "Shared");
        assert_eq!(imported.track_ids, vec![tid("a"), tid("b")]);
    }

    #[test]
    fn import_rejects_malformed_documents() {
        let mut playlists = Playlists::new();
        for json in ["{not json", r#"{"name": "No music"}"#, r#"{"name": " ", "music": []}"#] {
            assert!(matches!(
                playlists.import(json, &library()),
                Err(CoreError::InvalidInput(_))
            ));
        }
        assert!(playlists.is_empty());
    }

    #[test]
    fn export_then_import_into_another_library() {
        let (playlists, id) = with_playlist(&["b", "a"]);
        let json = playlists.export_json(&id, &library()).unwrap();

        let mut elsewhere = Playlists::new();
        let report = elsewhere.import(&json, &library()).unwrap();
        assert_eq!(report.unmatched, 0);
        assert_eq!(
            elsewhere.get(&report.playlist_id).unwrap().track_ids,
            vec![tid("b"), tid("a")]
        );
    }
}
