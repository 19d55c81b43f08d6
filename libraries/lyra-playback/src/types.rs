//! Core types for playback sequencing

use lyra_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlaybackError;

/// Play mode
///
/// Exactly one mode is active at a time. Each variant owns its advance
/// strategy in [`PlayMode::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    /// Play the queue once, front to back
    #[default]
    Sequential,

    /// Loop the current track
    RepeatOne,

    /// Loop the whole queue
    RepeatAll,

    /// Loop a random permutation of the queue
    Shuffle,
}

impl PlayMode {
    /// All modes, in the order the "toggle mode" command cycles through them
    pub const ALL: [Self; 4] = [
        Self::Sequential,
        Self::RepeatOne,
        Self::RepeatAll,
        Self::Shuffle,
    ];

    /// Stable name (`sequential`, `repeat-one`, `repeat-all`, `shuffle`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::RepeatOne => "repeat-one",
            Self::RepeatAll => "repeat-all",
            Self::Shuffle => "shuffle",
        }
    }

    /// The mode after this one in [`PlayMode::ALL`], wrapping around
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Sequential => Self::RepeatOne,
            Self::RepeatOne => Self::RepeatAll,
            Self::RepeatAll => Self::Shuffle,
            Self::Shuffle => Self::Sequential,
        }
    }

    /// Whether this mode plays from the shuffle order
    pub fn is_shuffle(self) -> bool {
        self == Self::Shuffle
    }

    /// Compute where an advance lands in an order of `len` items
    ///
    /// `position` is the cursor's index (`None` before anything was
    /// selected). Returns `None` when the move is not legal. Repeat-one is
    /// legal in both directions whatever the order holds.
    pub fn step(self, position: Option<usize>, len: usize, direction: Direction) -> Option<Target> {
        if self == Self::RepeatOne {
            return Some(Target::Restart);
        }
        if len == 0 {
            return None;
        }

        match self {
            Self::RepeatOne => Some(Target::Restart),
            Self::Sequential => match direction {
                Direction::Next => {
                    let index = position.map_or(0, |p| p + 1);
                    (index < len).then_some(Target::Index(index))
                }
                Direction::Previous => match position {
                    Some(p) if p > 0 => Some(Target::Index((p - 1).min(len - 1))),
                    _ => None,
                },
            },
            Self::RepeatAll | Self::Shuffle => {
                let index = match (direction, position) {
                    (Direction::Next, None) => 0,
                    (Direction::Next, Some(p)) => (p + 1) % len,
                    (Direction::Previous, Some(p)) if p > 0 && p <= len => p - 1,
                    (Direction::Previous, _) => len - 1,
                };
                Some(Target::Index(index))
            }
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayMode {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PlaybackError::InvalidPlayMode(s.to_string()))
    }
}

/// Advance direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Forward
    Next,

    /// Backward
    Previous,
}

/// Outcome of [`PlayMode::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Stay on the current track and play it again from the start
    Restart,

    /// Move to this index of the active order
    Index(usize),
}

/// Result of a legal advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Track that is current after the advance
    pub track_id: TrackId,

    /// Index of that track in the active order
    pub position: Option<usize>,

    /// True when the same track restarts (repeat-one)
    pub restart: bool,
}

/// Transient "where are we now" state
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackCursor {
    /// Track being played or paused
    pub current_id: Option<TrackId>,

    /// Index into the active order (`None` before anything was selected)
    pub position: Option<usize>,

    /// Whether playback is running
    pub is_playing: bool,

    /// Playback time within the current track, in seconds
    pub current_time: f64,
}

/// Coarse player state reported to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing selected, or the queue ran out
    #[default]
    Stopped,

    /// Waiting for the transport to finish loading
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Configuration for the playback manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume in `[0, 1]` (default: 0.7)
    pub volume: f64,

    /// Initial mute state (default: false)
    pub muted: bool,

    /// Initial play mode (default: sequential)
    pub play_mode: PlayMode,

    /// Volume change per up/down command (default: 0.1)
    pub volume_step: f64,

    /// Save mode, queue and volume after each change (default: true)
    pub persist: bool,

    /// Storage key for the persisted state (default: "player-state")
    pub state_key: String,

    /// Storage key for user playlists (default: "playlists")
    pub playlists_key: String,

    /// Seed for shuffle order; entropy when absent
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            muted: false,
            play_mode: PlayMode::Sequential,
            volume_step: 0.1,
            persist: true,
            state_key: "player-state".to_string(),
            playlists_key: "playlists".to_string(),
            shuffle_seed: None,
        }
    }
}
