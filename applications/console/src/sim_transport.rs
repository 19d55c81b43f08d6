//! Simulated media transport
//!
//! Stands in for an audio element: it never opens files, it only runs a
//! clock. Loads complete on the next tick, time advances while playing and
//! `Ended` fires once the clock reaches the track's duration.

use lyra_core::{MemoryLibrary, SourceHandle, TrackLibrary};
use lyra_playback::{LoadTicket, PlaybackError, Result, Transport, TransportEvent};
use std::time::Duration;
use tracing::{debug, trace};

/// Clock length for sources whose duration the library does not know
pub const FALLBACK_DURATION_SECS: f64 = 30.0;

#[derive(Debug, Clone)]
struct LoadedSource {
    source: SourceHandle,
    duration_secs: f64,
}

#[derive(Debug)]
pub struct SimulatedTransport {
    catalog: Vec<(SourceHandle, f64)>,
    pending: Option<(LoadTicket, SourceHandle)>,
    loaded: Option<LoadedSource>,
    playing: bool,
    time_secs: f64,
    volume: f64,
    muted: bool,
    events: Vec<TransportEvent>,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self {
            catalog: Vec::new(),
            pending: None,
            loaded: None,
            playing: false,
            time_secs: 0.0,
            volume: 1.0,
            muted: false,
            events: Vec::new(),
        }
    }

    /// Make every track of a library loadable
    pub fn from_library(library: &MemoryLibrary) -> Self {
        let mut transport = Self::new();
        for id in library.ids() {
            if let Some(track) = library.track(&id) {
                transport.register(track.source, track.duration_secs);
            }
        }
        transport
    }

    /// Make a source loadable
    ///
    /// A zero duration stands for "unknown"; the clock then runs for
    /// [`FALLBACK_DURATION_SECS`].
    pub fn register(&mut self, source: SourceHandle, duration_secs: f64) {
        let duration_secs = if duration_secs > 0.0 {
            duration_secs
        } else {
            FALLBACK_DURATION_SECS
        };
        match self.catalog.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = duration_secs,
            None => self.catalog.push((source, duration_secs)),
        }
    }

    /// Advance the clock and collect what happened
    pub fn tick(&mut self, elapsed: Duration) -> Vec<TransportEvent> {
        if let Some((ticket, source)) = self.pending.take() {
            self.finish_load(ticket, source);
        } else if self.playing {
            self.advance_clock(elapsed.as_secs_f64());
        }

        std::mem::take(&mut self.events)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    /// Output gain after mute
    pub fn gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    fn finish_load(&mut self, ticket: LoadTicket, source: SourceHandle) {
        let duration = self
            .catalog
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, d)| *d);

        match duration {
            Some(duration_secs) => {
                debug!(%ticket, duration_secs, "Simulated load complete");
                self.loaded = Some(LoadedSource {
                    source,
                    duration_secs,
                });
                self.time_secs = 0.0;
                self.events.push(TransportEvent::Loaded { ticket });
            }
            None => {
                self.events.push(TransportEvent::LoadFailed {
                    ticket,
                    message: format!("source unavailable: {:?}", source),
                });
            }
        }
    }

    fn advance_clock(&mut self, elapsed_secs: f64) {
        let Some(loaded) = &self.loaded else {
            return;
        };

        self.time_secs = (self.time_secs + elapsed_secs).min(loaded.duration_secs);
        trace!(time_secs = self.time_secs, "Clock advanced");
        self.events.push(TransportEvent::TimeUpdate {
            time_secs: self.time_secs,
        });

        if self.time_secs >= loaded.duration_secs {
            self.playing = false;
            self.events.push(TransportEvent::Ended);
        }
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SimulatedTransport {
    fn load(&mut self, source: &SourceHandle, ticket: LoadTicket) -> Result<()> {
        self.release();
        self.pending = Some((ticket, source.clone()));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.loaded.is_none() {
            return Err(PlaybackError::transport("no source loaded"));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.time_secs = 0.0;
    }

    fn seek(&mut self, time_secs: f64) {
        if let Some(loaded) = &self.loaded {
            self.time_secs = time_secs.clamp(0.0, loaded.duration_secs);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn duration(&self) -> Option<f64> {
        self.loaded.as_ref().map(|l| l.duration_secs)
    }

    fn release(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            trace!(source = ?loaded.source, "Released source");
        }
        self.pending = None;
        self.playing = false;
        self.time_secs = 0.0;
    }
}
