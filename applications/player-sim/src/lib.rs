//! Pulse Player Simulator
//!
//! Runs the Pulse playback controller and reel autoplay coordinator against
//! simulated media elements, so transport and scroll behavior can be
//! exercised and inspected without a browser.
//!
//! This library exposes the session runners for the binary and for tests.

pub mod config;
pub mod error;
pub mod reels;
pub mod session;

// Re-export commonly used types for convenience
pub use config::{ReelSettings, SessionSettings, SimConfig, DEFAULT_CONFIG_FILE};
pub use error::{Result, SimError};
pub use reels::{run_reels, ReelOptions, ReelReport};
pub use session::{run_play, PlayOptions, PlayReport};
