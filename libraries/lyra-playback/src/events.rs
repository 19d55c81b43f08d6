//! Playback Events
//!
//! Event-based communication for UI synchronization. The manager queues
//! events as state changes; the UI drains them after each call or on a tick.

use lyra_core::TrackId;
use serde::{Deserialize, Serialize};

use crate::types::{PlayMode, PlaybackState};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Playback state changed (playing, paused, stopped, loading)
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A different track became current
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Playback time moved or was sought
    PositionUpdate {
        /// Seconds from the start of the track
        time_secs: f64,
        /// Track duration, if known
        duration_secs: Option<f64>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// New volume level in `[0, 1]`
        level: f64,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Play mode changed
    PlayModeChanged {
        /// New mode
        mode: PlayMode,
    },

    /// Queue changed (replaced, appended or shrunk)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// A playlist was created, edited or deleted
    PlaylistsChanged {
        /// Number of playlists
        count: usize,
    },

    /// `next` ran past the end of a non-repeating queue
    QueueEnded,

    /// Transport failure; playback was paused
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlaybackEvent::PlayModeChanged {
            mode: PlayMode::RepeatAll,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "playModeChanged");
        assert_eq!(json["mode"], "repeat-all");

        let json = serde_json::to_value(PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
        })
        .unwrap();
        assert_eq!(json["state"], "loading");
    }
}
