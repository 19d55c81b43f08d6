//! WASM-compatible PlaybackManager wrapper

use js_sys::Function;
use lyra_core::{
    KeyValueStore, MemoryLibrary, PlaylistId, PlaylistUpdate, SourceHandle, TrackId,
    TrackMetadata,
};
use lyra_storage::{LocalStorageStore, MemoryStore};
use std::sync::Arc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::Blob;

use super::transport::{BlobCache, HtmlAudioTransport};
use crate::{map_key, InputFocus, KeyAction, PlaybackConfig, PlaybackError, PlaybackManager};

type Store = Box<dyn KeyValueStore>;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn ids_from_js(ids: JsValue) -> Result<Vec<TrackId>, JsValue> {
    serde_wasm_bindgen::from_value(ids)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse track ids: {}", e)))
}

/// WASM-compatible player
///
/// Wraps the core PlaybackManager with a JavaScript-friendly API. The page
/// registers tracks (and the `File`s behind them), then drives playback.
/// Playback events are delivered to the `onEvent` callback after each call.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: PlaybackManager<HtmlAudioTransport, Store>,
    library: Arc<MemoryLibrary>,
    blobs: BlobCache,
    on_event: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player
    ///
    /// `config` is an optional `PlaybackConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlayer, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js)?
        };

        let blobs = BlobCache::default();
        let transport = HtmlAudioTransport::new(blobs.clone())?;

        let store: Store = match LocalStorageStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(error = %e, "localStorage unavailable, preferences will not persist");
                Box::new(MemoryStore::new())
            }
        };

        let library = Arc::new(MemoryLibrary::new());
        let inner = PlaybackManager::new(config, transport, library.clone(), store);

        Ok(Self {
            inner,
            library,
            blobs,
            on_event: None,
        })
    }

    // ===== Library =====

    /// Register track metadata
    #[wasm_bindgen(js_name = registerTrack)]
    pub fn register_track(&mut self, track: JsValue) -> Result<(), JsValue> {
        let track: TrackMetadata = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {}", e)))?;
        self.library.insert(track);
        Ok(())
    }

    /// Register the file behind a `blob` source
    #[wasm_bindgen(js_name = registerFile)]
    pub fn register_file(&mut self, key: String, blob: Blob) {
        self.blobs.borrow_mut().insert(key, blob);
    }

    /// Delete a track from the library, every playlist and the queue
    #[wasm_bindgen(js_name = deleteTrack)]
    pub fn delete_track(&mut self, id: String) -> usize {
        let id = TrackId::new(id);
        if let Some(track) = self.library.remove(&id) {
            if let SourceHandle::Blob(key) = &track.source {
                self.blobs.borrow_mut().remove(key);
            }
        }
        let removed = self.inner.forget_track(&id);
        self.dispatch();
        removed
    }

    /// Distinct artist names, sorted
    pub fn artists(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.library.artists()).unwrap_or(JsValue::NULL)
    }

    /// Distinct album names, sorted
    pub fn albums(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.library.albums()).unwrap_or(JsValue::NULL)
    }

    // ===== Playback Control =====

    /// Load saved preferences and queue
    pub fn restore(&mut self) {
        self.inner.restore();
        self.dispatch();
    }

    /// Play a track from the start
    #[wasm_bindgen(js_name = playTrack)]
    pub fn play_track(&mut self, id: String) -> Result<(), JsValue> {
        let result = self.inner.play_track(&TrackId::new(id));
        self.finish(result)
    }

    /// Play or pause
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) -> Result<(), JsValue> {
        let result = self.inner.toggle_play_pause();
        self.finish(result)
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.inner.pause();
        self.dispatch();
    }

    /// Skip to next track
    pub fn next(&mut self) -> Result<(), JsValue> {
        let result = self.inner.next();
        self.finish(result)
    }

    /// Go to previous track
    pub fn previous(&mut self) -> Result<(), JsValue> {
        let result = self.inner.previous();
        self.finish(result)
    }

    /// Seek to position in seconds
    pub fn seek(&mut self, time_secs: f64) {
        self.inner.seek(time_secs);
        self.dispatch();
    }

    // ===== Volume Control =====

    /// Set volume (0-1)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: f64) {
        self.inner.set_volume(level);
        self.dispatch();
    }

    /// Raise volume by one step
    #[wasm_bindgen(js_name = volumeUp)]
    pub fn volume_up(&mut self) {
        self.inner.volume_up();
        self.dispatch();
    }

    /// Lower volume by one step
    #[wasm_bindgen(js_name = volumeDown)]
    pub fn volume_down(&mut self) {
        self.inner.volume_down();
        self.dispatch();
    }

    /// Mute or unmute
    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        self.inner.set_muted(muted);
        self.dispatch();
    }

    /// Toggle mute
    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
        self.dispatch();
    }

    // ===== Play Mode =====

    /// Set play mode by name; unknown names are ignored
    #[wasm_bindgen(js_name = setPlayMode)]
    pub fn set_play_mode(&mut self, mode: &str) -> bool {
        let accepted = self.inner.set_play_mode_named(mode);
        self.dispatch();
        accepted
    }

    /// Switch to the next play mode
    #[wasm_bindgen(js_name = cyclePlayMode)]
    pub fn cycle_play_mode(&mut self) -> String {
        let mode = self.inner.cycle_play_mode();
        self.dispatch();
        mode.to_string()
    }

    /// Flip the liked flag of the current track
    #[wasm_bindgen(js_name = toggleLike)]
    pub fn toggle_like(&mut self) -> Option<bool> {
        self.inner.toggle_like()
    }

    // ===== Queue Management =====

    /// Replace the queue with an array of track ids
    #[wasm_bindgen(js_name = setQueue)]
    pub fn set_queue(&mut self, ids: JsValue) -> Result<(), JsValue> {
        let ids = ids_from_js(ids)?;
        self.inner.set_queue(ids);
        self.dispatch();
        Ok(())
    }

    /// Replace the queue and start playing it
    #[wasm_bindgen(js_name = playQueue)]
    pub fn play_queue(&mut self, ids: JsValue, start: Option<String>) -> Result<(), JsValue> {
        let ids = ids_from_js(ids)?;
        let start = start.map(TrackId::new);
        let result = self.inner.play_queue(ids, start.as_ref());
        self.finish(result)
    }

    /// Append track ids to the queue
    #[wasm_bindgen(js_name = appendToQueue)]
    pub fn append_to_queue(&mut self, ids: JsValue) -> Result<(), JsValue> {
        let ids = ids_from_js(ids)?;
        self.inner.append_to_queue(ids);
        self.dispatch();
        Ok(())
    }

    /// Clear entire queue
    #[wasm_bindgen(js_name = clearQueue)]
    pub fn clear_queue(&mut self) {
        self.inner.clear_queue();
        self.dispatch();
    }

    // ===== Playlists =====

    /// Every playlist as an array of `{ id, name, description, trackIds, ... }`
    pub fn playlists(&self) -> JsValue {
        let playlists: Vec<_> = self.inner.playlists().iter().collect();
        serde_wasm_bindgen::to_value(&playlists).unwrap_or(JsValue::NULL)
    }

    /// Playlists holding a track
    #[wasm_bindgen(js_name = playlistsContaining)]
    pub fn playlists_containing(&self, track_id: String) -> JsValue {
        let playlists = self.inner.playlists().containing(&TrackId::new(track_id));
        serde_wasm_bindgen::to_value(&playlists).unwrap_or(JsValue::NULL)
    }

    /// Create a playlist, returning its id
    #[wasm_bindgen(js_name = createPlaylist)]
    pub fn create_playlist(
        &mut self,
        name: &str,
        description: Option<String>,
    ) -> Result<String, JsValue> {
        let result = self
            .inner
            .create_playlist(name, description.as_deref().unwrap_or_default());
        self.dispatch();
        result.map(|id| id.to_string()).map_err(to_js)
    }

    /// Delete a playlist
    #[wasm_bindgen(js_name = deletePlaylist)]
    pub fn delete_playlist(&mut self, id: String) -> bool {
        let deleted = self.inner.delete_playlist(&PlaylistId::new(id)).is_some();
        self.dispatch();
        deleted
    }

    /// Rename or re-describe a playlist
    #[wasm_bindgen(js_name = updatePlaylist)]
    pub fn update_playlist(
        &mut self,
        id: String,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<(), JsValue> {
        let update = PlaylistUpdate { name, description };
        let result = self.inner.update_playlist(&PlaylistId::new(id), update);
        self.finish(result)
    }

    /// Append a track to a playlist
    #[wasm_bindgen(js_name = addToPlaylist)]
    pub fn add_to_playlist(&mut self, id: String, track_id: String) -> Result<bool, JsValue> {
        let result = self
            .inner
            .add_to_playlist(&PlaylistId::new(id), TrackId::new(track_id));
        self.dispatch();
        result.map_err(to_js)
    }

    /// Remove a track from a playlist
    #[wasm_bindgen(js_name = removeFromPlaylist)]
    pub fn remove_from_playlist(&mut self, id: String, track_id: String) -> Result<bool, JsValue> {
        let result = self
            .inner
            .remove_from_playlist(&PlaylistId::new(id), &TrackId::new(track_id));
        self.dispatch();
        result.map_err(to_js)
    }

    /// Move a playlist entry
    #[wasm_bindgen(js_name = reorderPlaylist)]
    pub fn reorder_playlist(&mut self, id: String, from: usize, to: usize) -> Result<bool, JsValue> {
        let result = self.inner.reorder_playlist(&PlaylistId::new(id), from, to);
        self.dispatch();
        result.map_err(to_js)
    }

    /// Export a playlist as JSON text
    #[wasm_bindgen(js_name = exportPlaylist)]
    pub fn export_playlist(&self, id: String) -> Result<String, JsValue> {
        self.inner
            .export_playlist(&PlaylistId::new(id))
            .map_err(to_js)
    }

    /// Import a playlist from JSON text
    ///
    /// Returns `{ playlistId, total, matched, unmatched }`.
    #[wasm_bindgen(js_name = importPlaylist)]
    pub fn import_playlist(&mut self, json: &str) -> Result<JsValue, JsValue> {
        let result = self.inner.import_playlist(json);
        self.dispatch();
        let report = result.map_err(to_js)?;
        serde_wasm_bindgen::to_value(&report).map_err(to_js)
    }

    /// Replace the queue with a playlist and start playing it
    #[wasm_bindgen(js_name = playPlaylist)]
    pub fn play_playlist(&mut self, id: String, start: Option<String>) -> Result<(), JsValue> {
        let start = start.map(TrackId::new);
        let result = self
            .inner
            .play_playlist(&PlaylistId::new(id), start.as_ref());
        self.finish(result)
    }

    // ===== Keyboard =====

    /// Handle a `keydown`
    ///
    /// Runs player commands directly. Returns the action as
    /// `{ action, command? }` so the page can handle focus changes, or
    /// `null` when the key is not a shortcut.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, text_input_focused: bool) -> Result<JsValue, JsValue> {
        let focus = if text_input_focused {
            InputFocus::TextInput
        } else {
            InputFocus::None
        };

        let Some(action) = map_key(key, focus) else {
            return Ok(JsValue::NULL);
        };

        if let KeyAction::Command(command) = action {
            let result = self.inner.handle_command(command);
            self.finish(result)?;
        }
        serde_wasm_bindgen::to_value(&action).map_err(to_js)
    }

    /// Whether the page should call `preventDefault` for this key
    #[wasm_bindgen(js_name = preventsDefault)]
    pub fn prevents_default(key: &str) -> bool {
        crate::prevents_default(key)
    }

    // ===== Events =====

    /// Register the playback event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        self.on_event = Some(callback);
    }

    /// Register a callback run when the audio element reported something
    ///
    /// The page should respond by calling `pump()` (for example from a
    /// microtask).
    #[wasm_bindgen(js_name = onTransportActivity)]
    pub fn on_transport_activity(&mut self, callback: Function) {
        self.inner.transport().set_notifier(Some(callback));
    }

    /// Feed queued audio element events into the player
    pub fn pump(&mut self) {
        let events = self.inner.transport().take_events();
        for event in events {
            if let Err(e) = self.inner.handle_transport_event(event) {
                debug!(error = %e, "Transport event handling failed");
            }
        }
        self.dispatch();
    }

    // ===== State Queries =====

    /// Playback cursor `{ currentId, position, isPlaying, currentTime }`
    pub fn cursor(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.cursor()).unwrap_or(JsValue::NULL)
    }

    /// Coarse state: "stopped" | "loading" | "playing" | "paused"
    pub fn state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.state()).unwrap_or(JsValue::NULL)
    }

    /// Current play mode name
    #[wasm_bindgen(js_name = playMode)]
    pub fn play_mode(&self) -> String {
        self.inner.play_mode().to_string()
    }

    /// Queue as an array of ids
    pub fn queue(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.queue()).unwrap_or(JsValue::NULL)
    }

    /// Order next/previous follow, as an array of ids
    #[wasm_bindgen(js_name = activeOrder)]
    pub fn active_order(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.active_order()).unwrap_or(JsValue::NULL)
    }

    /// Current track metadata, or `null`
    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> JsValue {
        self.inner
            .current_track()
            .and_then(|track| serde_wasm_bindgen::to_value(&track).ok())
            .unwrap_or(JsValue::NULL)
    }

    /// Check if there is a next track
    #[wasm_bindgen(js_name = hasNext)]
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    /// Check if there is a previous track
    #[wasm_bindgen(js_name = hasPrevious)]
    pub fn has_previous(&self) -> bool {
        self.inner.has_previous()
    }

    /// Volume level (0-1)
    pub fn volume(&self) -> f64 {
        self.inner.volume()
    }

    /// Check if muted
    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.inner.is_muted()
    }

    /// Whether a track is loading
    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    // ===== Internal =====

    fn finish(&mut self, result: Result<(), PlaybackError>) -> Result<(), JsValue> {
        self.dispatch();
        result.map_err(to_js)
    }

    fn dispatch(&mut self) {
        let events = self.inner.drain_events();
        let Some(callback) = &self.on_event else {
            return;
        };

        for event in events {
            match serde_wasm_bindgen::to_value(&event) {
                Ok(value) => {
                    let _ = callback.call1(&JsValue::NULL, &value);
                }
                Err(e) => warn!(error = %e, "Failed to serialize playback event"),
            }
        }
    }
}
