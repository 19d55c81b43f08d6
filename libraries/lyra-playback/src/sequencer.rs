//! Playback sequencer
//!
//! Owns the queue, the play mode, the shuffle order and the playback cursor,
//! and decides what plays next. Every operation is a synchronous state
//! transition; nothing here touches the transport.
//!
//! Invariants maintained by every operation:
//! - the shuffle order exists exactly while the mode is shuffle, and is a
//!   permutation of the queue (same multiset)
//! - if the cursor has a current track that is in the active order, the
//!   position points at an occurrence of it
//! - if the active order is empty, the cursor has no current track and no
//!   position

use lyra_core::TrackId;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::shuffle;
use crate::types::{Direction, PlayMode, PlaybackCursor, Step, Target};

/// Queue, play mode and cursor state machine
#[derive(Debug, Clone)]
pub struct Sequencer {
    queue: Vec<TrackId>,
    mode: PlayMode,
    shuffle_order: Option<Vec<TrackId>>,
    cursor: PlaybackCursor,
    rng: StdRng,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Create an empty sequencer seeded from entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty sequencer with a deterministic shuffle order
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            queue: Vec::new(),
            mode: PlayMode::Sequential,
            shuffle_order: None,
            cursor: PlaybackCursor::default(),
            rng,
        }
    }

    // ===== Queries =====

    /// The canonical queue
    pub fn queue(&self) -> &[TrackId] {
        &self.queue
    }

    /// Current play mode
    pub fn play_mode(&self) -> PlayMode {
        self.mode
    }

    /// Shuffle order, present only in shuffle mode
    pub fn shuffle_order(&self) -> Option<&[TrackId]> {
        self.shuffle_order.as_deref()
    }

    /// Queue or shuffle order, whichever governs next/previous
    pub fn active_order(&self) -> &[TrackId] {
        match &self.shuffle_order {
            Some(order) if self.mode.is_shuffle() => order,
            _ => &self.queue,
        }
    }

    /// Playback cursor
    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    /// Current track id
    pub fn current_id(&self) -> Option<&TrackId> {
        self.cursor.current_id.as_ref()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.cursor.is_playing
    }

    /// Whether `advance(Next)` would move
    pub fn has_next(&self) -> bool {
        self.peek(Direction::Next).is_some()
    }

    /// Whether `advance(Previous)` would move
    pub fn has_previous(&self) -> bool {
        self.peek(Direction::Previous).is_some()
    }

    // ===== Transitions =====

    /// Replace the queue
    ///
    /// Clears the cursor. In shuffle mode a fresh shuffle order is drawn.
    pub fn set_queue(&mut self, ids: impl IntoIterator<Item = TrackId>) {
        self.queue = ids.into_iter().collect();
        self.cursor.current_id = None;
        self.cursor.position = None;
        self.cursor.is_playing = false;
        self.cursor.current_time = 0.0;

        if self.mode.is_shuffle() {
            self.regenerate_shuffle_order();
        }

        debug!(len = self.queue.len(), "Queue replaced");
    }

    /// Remove every entry from the queue
    pub fn clear(&mut self) {
        self.set_queue(Vec::new());
    }

    /// Add tracks to the end of the queue
    ///
    /// In shuffle mode the shuffle order is regenerated so it stays a
    /// permutation of the queue, and the cursor follows the current track.
    pub fn append(&mut self, ids: impl IntoIterator<Item = TrackId>) {
        let before = self.queue.len();
        self.queue.extend(ids);

        if self.queue.len() != before && self.mode.is_shuffle() {
            self.regenerate_shuffle_order();
            self.reanchor();
        }
    }

    /// Remove every occurrence of a track from the queue
    ///
    /// Returns how many entries were removed. If the current track was
    /// removed the cursor is cleared and playback stops; otherwise the
    /// cursor keeps pointing at the same track.
    pub fn remove_track(&mut self, id: &TrackId) -> usize {
        let before = self.queue.len();
        let removed_before_cursor = match (self.mode.is_shuffle(), self.cursor.position) {
            (false, Some(p)) => self.queue.iter().take(p).filter(|t| *t == id).count(),
            _ => 0,
        };

        self.queue.retain(|t| t != id);
        let removed = before - self.queue.len();
        if removed == 0 {
            return 0;
        }

        if self.mode.is_shuffle() {
            self.regenerate_shuffle_order();
        }

        if self.cursor.current_id.as_ref() == Some(id) || self.queue.is_empty() {
            self.reset_cursor();
        } else if self.mode.is_shuffle() {
            self.reanchor();
            self.clamp_position();
        } else {
            self.cursor.position = self.cursor.position.map(|p| p - removed_before_cursor);
            self.clamp_position();
        }

        debug!(track_id = %id, removed, "Removed track from queue");
        removed
    }

    /// Make `id` the current track and start playing
    ///
    /// The position moves to the first occurrence of `id` in the active
    /// order. If `id` is not in the active order the position is left as it
    /// was; callers should only select queue-derived ids.
    pub fn select_track(&mut self, id: &TrackId) {
        self.cursor.current_id = Some(id.clone());
        self.cursor.is_playing = true;

        match self.active_order().iter().position(|t| t == id) {
            Some(index) => self.cursor.position = Some(index),
            None => debug!(track_id = %id, "Selected track is not in the active order"),
        }
    }

    /// Compute an advance without applying it
    pub fn peek(&self, direction: Direction) -> Option<Step> {
        let order = self.active_order();

        match self.mode.step(self.cursor.position, order.len(), direction)? {
            Target::Restart => self.cursor.current_id.as_ref().map(|id| Step {
                track_id: id.clone(),
                position: self.cursor.position,
                restart: true,
            }),
            Target::Index(index) => order.get(index).map(|id| Step {
                track_id: id.clone(),
                position: Some(index),
                restart: false,
            }),
        }
    }

    /// Move the cursor one step in `direction`
    ///
    /// Returns the new current track, or `None` when the move is not legal.
    /// A refused `Next` means the queue ran out, so playback stops.
    pub fn advance(&mut self, direction: Direction) -> Option<Step> {
        let Some(step) = self.peek(direction) else {
            if direction == Direction::Next {
                self.cursor.is_playing = false;
            }
            return None;
        };

        self.cursor.current_id = Some(step.track_id.clone());
        self.cursor.position = step.position;
        self.cursor.current_time = 0.0;
        Some(step)
    }

    /// Switch play mode
    ///
    /// Entering shuffle draws a new shuffle order (also when already in
    /// shuffle); leaving it drops the order. The current track keeps
    /// playing and the position is moved to its index in the new order.
    pub fn set_play_mode(&mut self, mode: PlayMode) {
        let was_shuffle = self.mode.is_shuffle();
        self.mode = mode;

        if mode.is_shuffle() {
            self.regenerate_shuffle_order();
        } else {
            self.shuffle_order = None;
        }

        if was_shuffle || mode.is_shuffle() {
            self.reanchor();
        }
    }

    /// Switch play mode by name, ignoring unknown names
    ///
    /// Returns whether the name was recognised.
    pub fn set_play_mode_named(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(mode) => {
                self.set_play_mode(mode);
                true
            }
            Err(e) => {
                debug!(error = %e, "Ignoring play mode change");
                false
            }
        }
    }

    /// Set the playback time
    ///
    /// Negative and non-finite times are ignored. Clamping against the track
    /// duration is up to the caller.
    pub fn seek(&mut self, time_secs: f64) -> bool {
        if !time_secs.is_finite() || time_secs < 0.0 {
            debug!(time_secs, "Ignoring invalid seek");
            return false;
        }
        self.cursor.current_time = time_secs;
        true
    }

    /// Set the playing flag
    pub fn set_playing(&mut self, playing: bool) {
        self.cursor.is_playing = playing;
    }

    /// Clear the playing flag
    pub fn pause(&mut self) {
        self.cursor.is_playing = false;
    }

    // ===== Internals =====

    fn regenerate_shuffle_order(&mut self) {
        self.shuffle_order = Some(shuffle::shuffled(&self.queue, &mut self.rng));
    }

    fn reanchor(&mut self) {
        let index = self
            .cursor
            .current_id
            .as_ref()
            .and_then(|id| self.active_order().iter().position(|t| t == id));

        if let Some(index) = index {
            self.cursor.position = Some(index);
        }
    }

    fn clamp_position(&mut self) {
        let len = self.active_order().len();
        if let Some(p) = self.cursor.position {
            if p >= len {
                self.cursor.position = len.checked_sub(1);
            }
        }
    }

    fn reset_cursor(&mut self) {
        self.cursor.current_id = None;
        self.cursor.position = None;
        self.cursor.is_playing = false;
        self.cursor.current_time = 0.0;
    }
}
