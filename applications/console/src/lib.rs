//! Lyra console - terminal driver for the playback core
//!
//! Plays a JSON track manifest against a simulated clock, persisting player
//! preferences to a JSON file. Useful for exercising sequencing behavior
//! without a browser.

pub mod config;
pub mod error;
pub mod manifest;
pub mod session;
pub mod sim_transport;

pub use error::{ConsoleError, Result};
