//! Track manifest loading
//!
//! The console has no importer; tracks come from a JSON array such as
//!
//! ```json
//! [
//!   { "id": "intro", "title": "Intro", "artist": "Band", "duration_secs": 95.0, "path": "intro.flac" },
//!   { "title": "Stream", "duration_secs": 0, "url": "https://example.com/live.mp3" }
//! ]
//! ```
//!
//! Relative paths resolve against the manifest's directory. Entries without
//! an id get a generated one.

use crate::error::{ConsoleError, Result};
use lyra_core::{MemoryLibrary, SourceHandle, TrackId, TrackMetadata};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: Option<String>,
    title: String,
    artist: Option<String>,
    album: Option<String>,
    #[serde(default)]
    duration_secs: f64,
    path: Option<PathBuf>,
    url: Option<String>,
}

/// Parse manifest text into track metadata
pub fn parse(json: &str, base_dir: &Path) -> Result<Vec<TrackMetadata>> {
    let entries: Vec<ManifestEntry> = serde_json::from_str(json)?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let source = match (entry.path, entry.url) {
                (Some(path), None) => SourceHandle::Path(base_dir.join(path)),
                (None, Some(url)) => SourceHandle::Url(url),
                _ => {
                    return Err(ConsoleError::Manifest(format!(
                        "entry {} ({}) needs exactly one of path or url",
                        index, entry.title
                    )))
                }
            };

            let id = entry.id.map_or_else(TrackId::generate, TrackId::new);
            let mut track = TrackMetadata::new(id, entry.title, entry.duration_secs, source);
            track.artist = entry.artist;
            track.album = entry.album;
            Ok(track)
        })
        .collect()
}

/// Load a manifest file into a library
pub fn load(path: &Path) -> Result<MemoryLibrary> {
    let json = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tracks = parse(&json, base_dir)?;

    info!(path = %path.display(), tracks = tracks.len(), "Loaded track manifest");
    Ok(MemoryLibrary::from_tracks(tracks))
}
