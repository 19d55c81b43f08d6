//! Console configuration

use crate::error::{ConsoleError, Result};
use lyra_playback::{PlayMode, PlaybackConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lyra.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Simulated clock resolution in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// JSON manifest listing the tracks
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// JSON file holding persisted player state
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

/// Command-line values that win over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub manifest: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub play_mode: Option<PlayMode>,
    pub shuffle_seed: Option<u64>,
    pub no_persist: bool,
}

impl ConsoleConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `lyra.toml` is read if
    /// present. Environment variables prefixed with `LYRA_` come last, with
    /// `__` separating sections (`LYRA_PLAYBACK__VOLUME=0.4`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("LYRA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(manifest) = overrides.manifest {
            self.library.manifest = manifest;
        }
        if let Some(state_file) = overrides.state_file {
            self.storage.state_file = state_file;
        }
        if let Some(mode) = overrides.play_mode {
            self.playback.play_mode = mode;
        }
        if overrides.shuffle_seed.is_some() {
            self.playback.shuffle_seed = overrides.shuffle_seed;
        }
        if overrides.no_persist {
            self.playback.persist = false;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.playback.volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConsoleError::Config(format!(
                "playback.volume must be within [0, 1], got {}",
                volume
            )));
        }

        let step = self.playback.volume_step;
        if !step.is_finite() || step <= 0.0 || step > 1.0 {
            return Err(ConsoleError::Config(format!(
                "playback.volume_step must be within (0, 1], got {}",
                step
            )));
        }

        if self.tick_ms == 0 {
            return Err(ConsoleError::Config("tick_ms must be positive".to_string()));
        }

        Ok(())
    }
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        manifest: default_manifest(),
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("library.json")
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        state_file: default_state_file(),
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("lyra-state.json")
}

fn default_tick_ms() -> u64 {
    250
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            storage: default_storage(),
            playback: PlaybackConfig::default(),
            tick_ms: default_tick_ms(),
        }
    }
}
