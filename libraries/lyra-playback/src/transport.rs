//! Platform-agnostic media transport
//!
//! Abstracts the platform's playback primitive (an HTML audio element in the
//! browser, a simulated clock in the console driver). The transport never
//! decides what plays; it loads what it is told and reports what happened.

use lyra_core::SourceHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Identifies one load request
///
/// Minted by the playback manager, increasing per request. A completion
/// carrying an older ticket than the pending one is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Wrap a raw ticket value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw ticket value
    pub fn value(self) -> u64 {
        self.0
    }

    /// The ticket minted after this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events reported by a transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransportEvent {
    /// The source requested with `ticket` is ready to play
    Loaded {
        /// Ticket passed to `load`
        ticket: LoadTicket,
    },

    /// The source requested with `ticket` could not be loaded
    LoadFailed {
        /// Ticket passed to `load`
        ticket: LoadTicket,
        /// Platform error description
        message: String,
    },

    /// Playback time moved
    TimeUpdate {
        /// Seconds from the start of the track
        time_secs: f64,
    },

    /// The loaded source played to its end
    Ended,

    /// Playback failed after loading
    Error {
        /// Platform error description
        message: String,
    },
}

impl TransportEvent {
    /// Event for a rejected play request
    ///
    /// `name` is the rejection's error name (`NotAllowedError` when autoplay
    /// is blocked, `NotSupportedError` for undecodable sources). An
    /// `AbortError` means a later pause or load interrupted the request, so
    /// nothing is reported.
    pub fn play_rejected(name: Option<&str>, message: Option<&str>) -> Option<Self> {
        let name = name.unwrap_or("Error");
        if name == "AbortError" {
            return None;
        }
        let message = match message.filter(|m| !m.is_empty()) {
            Some(message) => format!("failed to play: {name}: {message}"),
            None => format!("failed to play: {name}"),
        };
        Some(Self::Error { message })
    }
}

/// Platform media transport
///
/// Holds at most one source at a time. `load` only starts loading; the
/// result arrives later as [`TransportEvent::Loaded`] or
/// [`TransportEvent::LoadFailed`] with the same ticket. A transport must
/// release the previously held source before acquiring the next one.
pub trait Transport {
    /// Begin loading a source
    ///
    /// Returns an error only when the request cannot even be issued (for
    /// example an unknown blob key).
    fn load(&mut self, source: &SourceHandle, ticket: LoadTicket) -> Result<()>;

    /// Start or resume playback of the loaded source
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Pause and rewind to the start
    fn stop(&mut self);

    /// Jump to a time in seconds
    fn seek(&mut self, time_secs: f64);

    /// Set output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64);

    /// Mute or unmute output
    fn set_muted(&mut self, muted: bool);

    /// Duration of the loaded source, if known
    fn duration(&self) -> Option<f64>;

    /// Drop the held source and any resources tied to it
    fn release(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn load(&mut self, source: &SourceHandle, ticket: LoadTicket) -> Result<()> {
        (**self).load(source, ticket)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn seek(&mut self, time_secs: f64) {
        (**self).seek(time_secs);
    }

    fn set_volume(&mut self, volume: f64) {
        (**self).set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted);
    }

    fn duration(&self) -> Option<f64> {
        (**self).duration()
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Scoped ownership of a transport resource
///
/// The release hook runs exactly once: on [`SourceLease::release`] or when
/// the lease is dropped, whichever comes first. Transports keep their current
/// source in an `Option<SourceLease<_>>` so replacing it releases the old one
/// on every path, including early returns on error.
pub struct SourceLease<R> {
    resource: R,
    on_release: Option<Box<dyn FnOnce(&R)>>,
}

impl<R> SourceLease<R> {
    /// Take ownership of `resource`, running `on_release` when done
    pub fn new(resource: R, on_release: impl FnOnce(&R) + 'static) -> Self {
        Self {
            resource,
            on_release: Some(Box::new(on_release)),
        }
    }

    /// Lease without a release hook
    pub fn unmanaged(resource: R) -> Self {
        Self {
            resource,
            on_release: None,
        }
    }

    /// Borrow the leased resource
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Release now
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(on_release) = self.on_release.take() {
            on_release(&self.resource);
        }
    }
}

impl<R> Drop for SourceLease<R> {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl<R: fmt::Debug> fmt::Debug for SourceLease<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceLease")
            .field("resource", &self.resource)
            .field("released", &self.on_release.is_none())
            .finish()
    }
}
