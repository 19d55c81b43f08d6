//! Playback manager - core orchestration
//!
//! Binds sequencer decisions to the transport, the library and the store.
//! Every call runs to completion synchronously; the only asynchronous
//! boundary is the transport's load, whose completion comes back through
//! [`PlaybackManager::handle_transport_event`].
//!
//! At most one load is in flight. A newer load supersedes the pending one:
//! completions carrying an older ticket are dropped (last skip wins), and
//! `Ended`/`TimeUpdate` from the outgoing source are ignored until the new
//! one is ready.

use lyra_core::{
    load_or, save, ImportReport, KeyValueStore, Playlist, PlaylistId, PlaylistUpdate, Playlists,
    TrackId, TrackLibrary, TrackMetadata,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    commands::PlayerCommand,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    persistence::PersistedState,
    sequencer::Sequencer,
    transport::{LoadTicket, Transport, TransportEvent},
    types::{Direction, PlayMode, PlaybackConfig, PlaybackCursor, PlaybackState},
    volume::Volume,
};

#[derive(Debug, Clone)]
struct PendingLoad {
    ticket: LoadTicket,
    track_id: TrackId,
}

/// Playback orchestrator
///
/// Owns the sequencer exclusively; nothing else mutates the queue, the
/// play mode or the cursor.
pub struct PlaybackManager<T, S> {
    config: PlaybackConfig,
    sequencer: Sequencer,
    transport: T,
    library: Arc<dyn TrackLibrary>,
    store: S,
    volume: Volume,
    playlists: Playlists,

    // Load bookkeeping
    last_ticket: LoadTicket,
    pending_load: Option<PendingLoad>,
    loaded: bool,

    // Set when `next` ran off the end, cleared by the next play
    queue_ended: bool,

    state: PlaybackState,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<T: Transport, S: KeyValueStore> PlaybackManager<T, S> {
    /// Create a playback manager
    ///
    /// Nothing is read from the store until [`PlaybackManager::restore`].
    pub fn new(
        config: PlaybackConfig,
        mut transport: T,
        library: Arc<dyn TrackLibrary>,
        store: S,
    ) -> Self {
        let mut sequencer = config
            .shuffle_seed
            .map_or_else(Sequencer::new, Sequencer::with_seed);
        sequencer.set_play_mode(config.play_mode);

        let mut volume = Volume::new(config.volume);
        volume.set_muted(config.muted);
        transport.set_volume(volume.level());
        transport.set_muted(volume.is_muted());

        Self {
            config,
            sequencer,
            transport,
            library,
            store,
            volume,
            playlists: Playlists::new(),
            last_ticket: LoadTicket::new(0),
            pending_load: None,
            loaded: false,
            queue_ended: false,
            state: PlaybackState::Stopped,
            pending_events: Vec::new(),
        }
    }

    /// Load saved preferences and queue
    ///
    /// The cursor is never restored: after a reload nothing is selected and
    /// nothing plays until the user asks.
    pub fn restore(&mut self) {
        if !self.config.persist {
            return;
        }

        let defaults = PersistedState::from_config(&self.config);
        let saved: PersistedState = load_or(&mut self.store, &self.config.state_key, defaults);

        self.stop_transport();

        self.volume = Volume::new(saved.volume);
        self.volume.set_muted(saved.is_muted);
        self.transport.set_volume(self.volume.level());
        self.transport.set_muted(self.volume.is_muted());

        self.sequencer.set_play_mode(saved.play_mode);
        self.sequencer.set_queue(saved.queue);
        self.queue_ended = false;

        self.playlists = Playlists::load(&mut self.store, &self.config.playlists_key);

        info!(
            mode = %self.sequencer.play_mode(),
            queue_len = self.sequencer.queue().len(),
            volume = self.volume.level(),
            playlists = self.playlists.len(),
            "Restored player state"
        );

        self.emit_volume_changed();
        self.pending_events.push(PlaybackEvent::PlayModeChanged {
            mode: self.sequencer.play_mode(),
        });
        self.emit_queue_changed();
        self.pending_events.push(PlaybackEvent::PlaylistsChanged {
            count: self.playlists.len(),
        });
        self.sync_state();
    }

    // ===== Queue Management =====

    /// Replace the queue
    ///
    /// Clears the current track and stops the transport.
    pub fn set_queue(&mut self, ids: impl IntoIterator<Item = TrackId>) {
        let had_track = self.sequencer.current_id().is_some() || self.pending_load.is_some();
        self.sequencer.set_queue(ids);
        if had_track {
            self.stop_transport();
        }
        self.queue_ended = false;

        self.emit_queue_changed();
        self.sync_state();
        self.persist();
    }

    /// Replace the queue and start playing it
    ///
    /// Starts at `start` if given, else at the front of the active order
    /// (the first shuffled track in shuffle mode).
    pub fn play_queue(
        &mut self,
        ids: impl IntoIterator<Item = TrackId>,
        start: Option<&TrackId>,
    ) -> Result<()> {
        self.set_queue(ids);

        let first = match start {
            Some(id) if !self.sequencer.queue().is_empty() => id.clone(),
            _ => self
                .sequencer
                .active_order()
                .first()
                .cloned()
                .ok_or(PlaybackError::QueueEmpty)?,
        };
        self.play_track(&first)
    }

    /// Add tracks to the end of the queue
    pub fn append_to_queue(&mut self, ids: impl IntoIterator<Item = TrackId>) {
        self.sequencer.append(ids);
        self.emit_queue_changed();
        self.persist();
    }

    /// Remove every occurrence of a track from the queue
    ///
    /// Stops playback if the current track went away. Returns how many
    /// entries were removed.
    pub fn remove_track(&mut self, id: &TrackId) -> usize {
        let had_current = self.sequencer.current_id().is_some();
        let removed = self.sequencer.remove_track(id);
        if removed == 0 {
            return 0;
        }

        if had_current && self.sequencer.current_id().is_none() {
            info!(track_id = %id, "Current track removed, stopping");
            self.stop_transport();
        }

        self.emit_queue_changed();
        self.sync_state();
        self.persist();
        removed
    }

    /// Empty the queue
    pub fn clear_queue(&mut self) {
        self.set_queue(Vec::new());
    }

    // ===== Playback Control =====

    /// Start playing a track from the beginning
    pub fn play_track(&mut self, id: &TrackId) -> Result<()> {
        if !self.library.contains(id) {
            return Err(PlaybackError::TrackNotFound(id.clone()));
        }

        let previous = self.sequencer.current_id().cloned();
        self.sequencer.select_track(id);
        self.sequencer.seek(0.0);
        self.queue_ended = false;

        self.emit_track_changed(previous, id);
        self.begin_load(id)
    }

    /// Pause if playing, otherwise resume the current track
    ///
    /// Does nothing when no track is selected.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        let Some(current) = self.sequencer.current_id().cloned() else {
            debug!("Nothing selected, ignoring play/pause");
            return Ok(());
        };

        if self.sequencer.is_playing() {
            self.pause();
            return Ok(());
        }

        self.sequencer.set_playing(true);
        self.queue_ended = false;

        if self.pending_load.is_some() {
            // Starts once the load completes
            self.sync_state();
            Ok(())
        } else if self.loaded {
            self.start_transport()
        } else {
            self.begin_load(&current)
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if !self.sequencer.is_playing() {
            return;
        }
        self.transport.pause();
        self.sequencer.pause();
        self.sync_state();
    }

    /// Move to the next or previous track
    ///
    /// In repeat-one the current track restarts. When a non-repeating queue
    /// runs out the transport stops and [`PlaybackEvent::QueueEnded`] is
    /// emitted.
    pub fn skip(&mut self, direction: Direction) -> Result<()> {
        let previous = self.sequencer.current_id().cloned();
        let was_playing = self.sequencer.is_playing() || self.pending_load.is_some();

        let Some(step) = self.sequencer.advance(direction) else {
            // A track picked from the library may play with an empty queue
            if direction == Direction::Next
                && (was_playing || !self.sequencer.active_order().is_empty())
            {
                info!("Reached end of queue");
                self.pending_load = None;
                self.transport.stop();
                self.sequencer.seek(0.0);
                self.queue_ended = true;
                self.pending_events.push(PlaybackEvent::QueueEnded);
            }
            self.sync_state();
            return Ok(());
        };

        self.sequencer.set_playing(true);
        self.queue_ended = false;

        if step.restart {
            debug!(track_id = %step.track_id, "Restarting track");
            if self.pending_load.is_some() {
                self.sync_state();
                return Ok(());
            }
            if self.loaded {
                self.transport.seek(0.0);
                self.emit_position(0.0);
                return self.start_transport();
            }
            return self.begin_load(&step.track_id);
        }

        self.emit_track_changed(previous, &step.track_id);
        self.begin_load(&step.track_id)
    }

    /// Skip to the next track
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<()> {
        self.skip(Direction::Next)
    }

    /// Go back to the previous track
    pub fn previous(&mut self) -> Result<()> {
        self.skip(Direction::Previous)
    }

    /// The transport reached the end of the current track
    pub fn on_track_ended(&mut self) -> Result<()> {
        debug!("Track ended");
        self.skip(Direction::Next)
    }

    /// The transport failed
    ///
    /// Pauses playback and reports the error. There is no automatic retry;
    /// the next play request loads the track again.
    pub fn on_transport_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(message = %message, "Transport error, pausing playback");

        self.pending_load = None;
        self.loaded = false;
        self.transport.pause();
        self.sequencer.pause();

        self.pending_events.push(PlaybackEvent::Error { message });
        self.sync_state();
    }

    /// Seek within the current track
    ///
    /// Clamps to `[0, duration]`. The duration comes from the library, or
    /// from the transport when the library does not know it. Non-finite
    /// times are ignored.
    pub fn seek(&mut self, time_secs: f64) {
        if !time_secs.is_finite() {
            debug!(time_secs, "Ignoring non-finite seek");
            return;
        }
        let Some(current) = self.sequencer.current_id().cloned() else {
            return;
        };

        let duration = self.duration_of(&current);
        let clamped = match duration {
            Some(d) => time_secs.clamp(0.0, d),
            None => time_secs.max(0.0),
        };

        self.sequencer.seek(clamped);
        if self.loaded {
            self.transport.seek(clamped);
        }
        self.emit_position(clamped);
    }

    // ===== Volume Control =====

    /// Set volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, level: f64) {
        if !level.is_finite() {
            debug!(level, "Ignoring non-finite volume");
            return;
        }
        if self.volume.set_level(level) {
            self.transport.set_volume(self.volume.level());
            self.emit_volume_changed();
            self.persist();
        }
    }

    /// Raise volume by one step
    pub fn volume_up(&mut self) {
        self.set_volume(self.volume.level() + self.config.volume_step.abs());
    }

    /// Lower volume by one step
    pub fn volume_down(&mut self) {
        self.set_volume(self.volume.level() - self.config.volume_step.abs());
    }

    /// Mute or unmute
    pub fn set_muted(&mut self, muted: bool) {
        if self.volume.is_muted() == muted {
            return;
        }
        self.volume.set_muted(muted);
        self.transport.set_muted(muted);
        self.emit_volume_changed();
        self.persist();
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.volume.is_muted());
    }

    // ===== Play Mode =====

    /// Switch play mode
    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.sequencer.set_play_mode(mode);
        info!(mode = %mode, "Play mode changed");
        self.pending_events
            .push(PlaybackEvent::PlayModeChanged { mode });
        self.persist();
    }

    /// Switch play mode by name
    ///
    /// Unknown names are ignored. Returns whether the name was recognised.
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

    /// Switch to the next play mode in cycle order
    pub fn cycle_play_mode(&mut self) -> PlayMode {
        let mode = self.sequencer.play_mode().next();
        self.set_play_mode(mode);
        mode
    }

    /// Flip the liked flag of the current track
    pub fn toggle_like(&mut self) -> Option<bool> {
        let current = self.sequencer.current_id()?;
        let liked = self.library.toggle_like(current);
        debug!(track_id = %current, ?liked, "Toggled like");
        liked
    }

    // ===== Playlists =====

    /// All user playlists
    pub fn playlists(&self) -> &Playlists {
        &self.playlists
    }

    /// Create an empty playlist, returning its id
    pub fn create_playlist(&mut self, name: &str, description: &str) -> Result<PlaylistId> {
        let id = self.playlists.create(name, description)?.id.clone();
        info!(playlist_id = %id, "Playlist created");
        self.playlists_changed();
        Ok(id)
    }

    /// Delete a playlist
    ///
    /// The queue is left alone even if it was started from this playlist.
    pub fn delete_playlist(&mut self, id: &PlaylistId) -> Option<Playlist> {
        let removed = self.playlists.delete(id)?;
        info!(playlist_id = %id, "Playlist deleted");
        self.playlists_changed();
        Some(removed)
    }

    /// Rename or re-describe a playlist
    pub fn update_playlist(&mut self, id: &PlaylistId, update: PlaylistUpdate) -> Result<()> {
        self.playlists.update(id, update)?;
        self.playlists_changed();
        Ok(())
    }

    /// Append a library track to a playlist
    ///
    /// Returns `false` when the playlist already holds it.
    pub fn add_to_playlist(&mut self, id: &PlaylistId, track: TrackId) -> Result<bool> {
        if !self.library.contains(&track) {
            return Err(PlaybackError::TrackNotFound(track));
        }
        let added = self.playlists.add_track(id, track)?;
        if added {
            self.playlists_changed();
        }
        Ok(added)
    }

    /// Remove a track from a playlist
    pub fn remove_from_playlist(&mut self, id: &PlaylistId, track: &TrackId) -> Result<bool> {
        let removed = self.playlists.remove_track(id, track)?;
        if removed {
            self.playlists_changed();
        }
        Ok(removed)
    }

    /// Move a playlist entry from one index to another
    pub fn reorder_playlist(&mut self, id: &PlaylistId, from: usize, to: usize) -> Result<bool> {
        let moved = self.playlists.reorder(id, from, to)?;
        if moved {
            self.playlists_changed();
        }
        Ok(moved)
    }

    /// Export a playlist as portable JSON
    pub fn export_playlist(&self, id: &PlaylistId) -> Result<String> {
        Ok(self.playlists.export_json(id, self.library.as_ref())?)
    }

    /// Create a playlist from exported JSON, matching tracks by tags
    pub fn import_playlist(&mut self, json: &str) -> Result<ImportReport> {
        let report = self.playlists.import(json, self.library.as_ref())?;
        info!(
            playlist_id = %report.playlist_id,
            matched = report.matched,
            unmatched = report.unmatched,
            "Playlist imported"
        );
        self.playlists_changed();
        Ok(report)
    }

    /// Replace the queue with a playlist and start playing it
    ///
    /// An empty playlist fails with [`PlaybackError::QueueEmpty`].
    pub fn play_playlist(&mut self, id: &PlaylistId, start: Option<&TrackId>) -> Result<()> {
        let tracks = self
            .playlists
            .get(id)
            .map(|p| p.track_ids.clone())
            .ok_or_else(|| PlaybackError::PlaylistNotFound(id.clone()))?;
        info!(playlist_id = %id, len = tracks.len(), "Playing playlist");
        self.play_queue(tracks, start)
    }

    /// Drop every reference to a track deleted from the library
    ///
    /// Removes it from all playlists and from the queue, stopping playback
    /// if it was current. Returns how many queue entries were removed.
    pub fn forget_track(&mut self, id: &TrackId) -> usize {
        if self.playlists.forget_track(id) > 0 {
            self.playlists_changed();
        }
        self.remove_track(id)
    }

    // ===== Dispatch =====

    /// Run a keyboard/UI command
    pub fn handle_command(&mut self, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::TogglePlay => self.toggle_play_pause()?,
            PlayerCommand::Next => self.next()?,
            PlayerCommand::Previous => self.previous()?,
            PlayerCommand::VolumeUp => self.volume_up(),
            PlayerCommand::VolumeDown => self.volume_down(),
            PlayerCommand::ToggleMode => {
                self.cycle_play_mode();
            }
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::ToggleLike => {
                self.toggle_like();
            }
        }
        Ok(())
    }

    /// Feed a transport event back into the player
    ///
    /// Events must be delivered in the order the transport produced them.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::Loaded { ticket } => {
                let Some(pending) = self.take_pending(ticket) else {
                    debug!(%ticket, "Ignoring stale load completion");
                    return Ok(());
                };

                info!(track_id = %pending.track_id, "Track loaded");
                self.loaded = true;

                let time = self.sequencer.cursor().current_time;
                if time > 0.0 {
                    self.transport.seek(time);
                }

                if self.sequencer.is_playing() {
                    self.start_transport()
                } else {
                    self.sync_state();
                    Ok(())
                }
            }
            TransportEvent::LoadFailed { ticket, message } => {
                match self.take_pending(ticket) {
                    Some(pending) => {
                        warn!(track_id = %pending.track_id, "Load failed");
                        self.on_transport_error(message);
                    }
                    None => debug!(%ticket, "Ignoring stale load failure"),
                }
                Ok(())
            }
            TransportEvent::TimeUpdate { time_secs } => {
                if self.pending_load.is_none() && self.sequencer.seek(time_secs) {
                    self.emit_position(time_secs);
                }
                Ok(())
            }
            TransportEvent::Ended => {
                if self.pending_load.is_some() {
                    debug!("Ignoring end of superseded source");
                    return Ok(());
                }
                self.on_track_ended()
            }
            TransportEvent::Error { message } => {
                self.on_transport_error(message);
                Ok(())
            }
        }
    }

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== State Queries =====

    /// Playback cursor
    pub fn cursor(&self) -> &PlaybackCursor {
        self.sequencer.cursor()
    }

    /// Coarse player state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current play mode
    pub fn play_mode(&self) -> PlayMode {
        self.sequencer.play_mode()
    }

    /// Queue in insertion order
    pub fn queue(&self) -> &[TrackId] {
        self.sequencer.queue()
    }

    /// Order next/previous follow
    pub fn active_order(&self) -> &[TrackId] {
        self.sequencer.active_order()
    }

    /// Check if there is a next track
    pub fn has_next(&self) -> bool {
        self.sequencer.has_next()
    }

    /// Check if there is a previous track
    pub fn has_previous(&self) -> bool {
        self.sequencer.has_previous()
    }

    /// Metadata of the current track
    pub fn current_track(&self) -> Option<TrackMetadata> {
        self.sequencer
            .current_id()
            .and_then(|id| self.library.track(id))
    }

    /// Volume level in `[0, 1]`
    pub fn volume(&self) -> f64 {
        self.volume.level()
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport (for drivers that pump it)
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Borrow the store
    pub fn store(&self) -> &S {
        &self.store
    }

    // ===== Internals =====

    fn begin_load(&mut self, id: &TrackId) -> Result<()> {
        let Some(track) = self.library.track(id) else {
            let err = PlaybackError::TrackNotFound(id.clone());
            self.on_transport_error(err.to_string());
            return Err(err);
        };

        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;

        if let Some(stale) = self.pending_load.take() {
            debug!(ticket = %stale.ticket, track_id = %stale.track_id, "Superseding pending load");
        }
        self.loaded = false;

        match self.transport.load(&track.source, ticket) {
            Ok(()) => {
                debug!(%ticket, track_id = %id, "Loading track");
                self.pending_load = Some(PendingLoad {
                    ticket,
                    track_id: id.clone(),
                });
                self.library.mark_played(id);
                self.sync_state();
                Ok(())
            }
            Err(e) => {
                self.on_transport_error(e.to_string());
                Err(e)
            }
        }
    }

    fn start_transport(&mut self) -> Result<()> {
        match self.transport.play() {
            Ok(()) => {
                self.sync_state();
                Ok(())
            }
            Err(e) => {
                self.on_transport_error(e.to_string());
                Err(e)
            }
        }
    }

    fn stop_transport(&mut self) {
        self.pending_load = None;
        self.loaded = false;
        self.transport.stop();
        self.transport.release();
    }

    fn take_pending(&mut self, ticket: LoadTicket) -> Option<PendingLoad> {
        match &self.pending_load {
            Some(pending) if pending.ticket == ticket => self.pending_load.take(),
            _ => None,
        }
    }

    fn duration_of(&self, id: &TrackId) -> Option<f64> {
        // Zero means the library could not read the duration
        self.library
            .duration_secs(id)
            .filter(|d| *d > 0.0)
            .or_else(|| self.transport.duration())
            .filter(|d| d.is_finite() && *d >= 0.0)
    }

    fn persist(&mut self) {
        if !self.config.persist {
            return;
        }

        let snapshot = PersistedState {
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            play_mode: self.sequencer.play_mode(),
            queue: self.sequencer.queue().to_vec(),
        };

        if let Err(e) = save(&mut self.store, &self.config.state_key, &snapshot) {
            warn!(error = %e, "Failed to save player state");
        }
    }

    fn playlists_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::PlaylistsChanged {
            count: self.playlists.len(),
        });
        if !self.config.persist {
            return;
        }
        if let Err(e) = self.playlists.save(&mut self.store, &self.config.playlists_key) {
            warn!(error = %e, "Failed to save playlists");
        }
    }

    fn compute_state(&self) -> PlaybackState {
        if self.sequencer.is_playing() {
            if self.pending_load.is_some() {
                PlaybackState::Loading
            } else {
                PlaybackState::Playing
            }
        } else if self.sequencer.current_id().is_some() && !self.queue_ended {
            PlaybackState::Paused
        } else {
            PlaybackState::Stopped
        }
    }

    fn sync_state(&mut self) {
        let state = self.compute_state();
        if state != self.state {
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_track_changed(&mut self, previous: Option<TrackId>, current: &TrackId) {
        if previous.as_ref() == Some(current) {
            return;
        }
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: current.clone(),
            previous_track_id: previous,
        });
    }

    fn emit_position(&mut self, time_secs: f64) {
        let duration_secs = self
            .sequencer
            .current_id()
            .cloned()
            .and_then(|id| self.duration_of(&id));
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            time_secs,
            duration_secs,
        });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.sequencer.queue().len(),
        });
    }
}
