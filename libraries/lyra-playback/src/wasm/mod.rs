//! WASM bindings for lyra-playback
//!
//! Drives the playback manager from a browser page: an `HTMLAudioElement`
//! transport, `localStorage` persistence and JS callbacks for events.

mod manager;
mod transport;

pub use manager::WasmPlayer;
pub use transport::{BlobCache, HtmlAudioTransport};
