//! Error types for playback control
//!
//! Only caller mistakes surface here. Media failures (rejected play requests,
//! broken sources, stale signals) are absorbed by the controller and reported
//! through events instead.

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Track rejected by core validation
    #[error(transparent)]
    Core(#[from] pulse_core::PulseError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
