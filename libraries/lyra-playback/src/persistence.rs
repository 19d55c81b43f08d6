//! Persisted player preferences
//!
//! Only preferences and the queue survive a reload. The cursor (current
//! track, playing flag, time) is never written, so a reload never resumes
//! playback on its own.

use lyra_core::TrackId;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::types::{PlayMode, PlaybackConfig};
use crate::volume::DEFAULT_VOLUME;

/// Stored under [`PlaybackConfig::state_key`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    /// Volume in `[0, 1]`
    pub volume: f64,

    /// Mute flag
    pub is_muted: bool,

    /// Play mode; unknown names load as the default mode
    #[serde(deserialize_with = "lenient_mode")]
    pub play_mode: PlayMode,

    /// Queue contents in insertion order
    pub queue: Vec<TrackId>,
}

impl PersistedState {
    /// Initial state for a player with no saved data
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            volume: config.volume,
            is_muted: config.muted,
            play_mode: config.play_mode,
            queue: Vec::new(),
        }
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            is_muted: false,
            play_mode: PlayMode::Sequential,
            queue: Vec::new(),
        }
    }
}

fn lenient_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PlayMode, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(name.parse().unwrap_or_else(|_| {
        debug!(name = %name, "Unknown stored play mode, using default");
        PlayMode::default()
    }))
}
