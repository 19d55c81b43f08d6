//! Volume control
//!
//! Linear `[0, 1]` level, as HTML media elements take it, with a mute flag
//! that preserves the level.

/// Default level for new players
pub const DEFAULT_VOLUME: f64 = 0.7;

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level in `[0, 1]`
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create a volume controller
    ///
    /// Out-of-range levels are clamped; non-finite levels fall back to the
    /// default.
    pub fn new(level: f64) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };

        Self {
            level,
            muted: false,
        }
    }

    /// Set volume level
    ///
    /// Clamps to `[0, 1]`. Non-finite values are ignored. Returns whether the
    /// level changed.
    pub fn set_level(&mut self, level: f64) -> bool {
        if !level.is_finite() {
            return false;
        }
        let level = level.clamp(0.0, 1.0);
        let changed = (level - self.level).abs() > f64::EPSILON;
        self.level = level;
        changed
    }

    /// Current level in `[0, 1]`
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Raise the level by `step`
    pub fn step_up(&mut self, step: f64) -> bool {
        self.set_level(self.level + step.abs())
    }

    /// Lower the level by `step`
    pub fn step_down(&mut self, step: f64) -> bool {
        self.set_level(self.level - step.abs())
    }

    /// Set mute state
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Effective output gain: 0 when muted, the level otherwise
    pub fn gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}
