//! Lyra - Playback Management
//!
//! Platform-agnostic playback sequencing for Lyra.
//!
//! This crate provides:
//! - Queue with duplicates, sequential / repeat-one / repeat-all / shuffle modes
//! - Shuffle order (Fisher-Yates), stable for a whole shuffle session
//! - Volume control (linear 0-1, mute/unmute)
//! - Seek with clamping against the track duration
//! - Persisted preferences (mode, queue, volume), never the playback cursor
//! - Keyboard shortcut mapping with text-input suppression
//! - Browser bindings over `HTMLAudioElement` (`wasm` feature)
//!
//! # Architecture
//!
//! `lyra-playback` never decodes audio and never owns global state:
//! - [`Sequencer`] is the pure state machine deciding what plays next
//! - [`PlaybackManager`] binds it to a [`Transport`], a
//!   [`TrackLibrary`](lyra_core::TrackLibrary) and a
//!   [`KeyValueStore`](lyra_core::KeyValueStore), all passed in at construction
//! - transports report back through [`TransportEvent`]s the driver feeds to
//!   [`PlaybackManager::handle_transport_event`]
//!
//! # Example: Sequencing
//!
//! ```rust
//! use lyra_core::TrackId;
//! use lyra_playback::{Direction, PlayMode, Sequencer};
//!
//! let mut seq = Sequencer::with_seed(1);
//! seq.set_queue(["a", "b", "c"].map(TrackId::new));
//! seq.select_track(&TrackId::new("c"));
//!
//! // Sequential stops at the end
//! assert!(seq.advance(Direction::Next).is_none());
//! assert!(!seq.is_playing());
//!
//! // Repeat-all wraps around
//! seq.set_play_mode(PlayMode::RepeatAll);
//! let step = seq.advance(Direction::Next).unwrap();
//! assert_eq!(step.track_id, TrackId::new("a"));
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use lyra_core::{MemoryLibrary, SourceHandle};
//! use lyra_playback::{LoadTicket, PlaybackConfig, PlaybackManager, Result, Transport};
//! use lyra_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! // Implement Transport for your platform
//! struct MyTransport;
//!
//! impl Transport for MyTransport {
//!     fn load(&mut self, source: &SourceHandle, ticket: LoadTicket) -> Result<()> {
//!         // Start loading; report TransportEvent::Loaded { ticket } later
//!         Ok(())
//!     }
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) {}
//!     fn stop(&mut self) {}
//!     fn seek(&mut self, _time_secs: f64) {}
//!     fn set_volume(&mut self, _volume: f64) {}
//!     fn set_muted(&mut self, _muted: bool) {}
//!     fn duration(&self) -> Option<f64> { None }
//!     fn release(&mut self) {}
//! }
//!
//! let library = Arc::new(MemoryLibrary::new());
//! let mut manager = PlaybackManager::new(
//!     PlaybackConfig::default(),
//!     MyTransport,
//!     library,
//!     MemoryStore::new(),
//! );
//! manager.restore();
//! ```

mod commands;
mod error;
mod events;
mod manager;
mod persistence;
mod sequencer;
pub mod shuffle;
mod transport;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use commands::{map_key, prevents_default, InputFocus, KeyAction, PlayerCommand};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use manager::PlaybackManager;
pub use persistence::PersistedState;
pub use sequencer::Sequencer;
pub use transport::{LoadTicket, SourceLease, Transport, TransportEvent};
pub use types::{
    Direction, PlayMode, PlaybackConfig, PlaybackCursor, PlaybackState, Step, Target,
};
pub use volume::{Volume, DEFAULT_VOLUME};
