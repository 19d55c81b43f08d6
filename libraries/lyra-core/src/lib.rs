//! Lyra Core
//!
//! Platform-agnostic core types and collaborator traits for Lyra.
//!
//! The core crate defines:
//! - **Domain Types**: `TrackId`, `TrackMetadata`, `SourceHandle`
//! - **Playlists**: `Playlists`, persisted as one document, with tag-based export/import
//! - **Collaborator Traits**: `TrackLibrary` (library lookup), `KeyValueStore` (persistence)
//! - **Persistence Helpers**: typed `load_or` / `save` over any `KeyValueStore`
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lyra_core::{MemoryLibrary, SourceHandle, TrackId, TrackLibrary, TrackMetadata};
//!
//! let library = MemoryLibrary::new();
//! library.insert(TrackMetadata::new("a", "Intro", 95.0, SourceHandle::Url("intro.mp3".into())));
//!
//! assert_eq!(library.duration_secs(&TrackId::new("a")), Some(95.0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod library;
pub mod playlist;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use library::MemoryLibrary;
pub use playlist::{ExportedTrack, ImportReport, Playlist, PlaylistExport, PlaylistUpdate, Playlists};
pub use storage::{load_or, save};
pub use traits::{KeyValueStore, TrackLibrary};
pub use types::{PlaylistId, SourceHandle, TrackId, TrackMetadata};
