/// Track domain type
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::TrackId;

/// Where a transport finds the audio bytes for a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SourceHandle {
    /// File on the local filesystem
    Path(PathBuf),

    /// Remote or already-resolved URL
    Url(String),

    /// Key into a browser-side cache of imported `File`/`Blob` objects
    Blob(String),
}

/// Library metadata for one imported audio file
///
/// Owned by the library. The playback core only ever holds a [`TrackId`]
/// and asks the library for this record when it needs a source or duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Duration in seconds (never negative)
    pub duration_secs: f64,

    /// Source the transport loads
    pub source: SourceHandle,

    /// Whether the user marked the track as a favourite
    #[serde(default)]
    pub liked: bool,

    /// When the track was imported
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,

    /// When playback of the track last started
    #[serde(default)]
    pub last_played_at: Option<DateTime<Utc>>,
}

impl TrackMetadata {
    /// Create a new track with minimal metadata
    ///
    /// Negative or non-finite durations are stored as zero.
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        duration_secs: f64,
        source: SourceHandle,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            album: None,
            duration_secs: sanitize_duration(duration_secs),
            source,
            liked: false,
            added_at: Utc::now(),
            last_played_at: None,
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

fn sanitize_duration(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}
