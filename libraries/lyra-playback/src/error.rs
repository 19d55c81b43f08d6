//! Error types for playback management

use lyra_core::{CoreError, PlaylistId, TrackId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track is not in the library
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Playlist does not exist
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Rejected argument (blank playlist name, malformed import)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// An operation needed a current track and there is none
    #[error("No track selected")]
    NoTrackSelected,

    /// Media transport failed to load or play
    #[error("Transport error: {0}")]
    Transport(String),

    /// Persistence backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unknown play mode name
    #[error("Invalid play mode: {0}")]
    InvalidPlayMode(String),
}

impl PlaybackError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

impl From<CoreError> for PlaybackError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TrackNotFound(id) => Self::TrackNotFound(id),
            CoreError::PlaylistNotFound(id) => Self::PlaylistNotFound(id),
            CoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
