/// Core error types for Pulse
use thiserror::Error;

use crate::types::TrackId;

/// Result type alias using `PulseError`
pub type Result<T> = std::result::Result<T, PulseError>;

/// Core error type for Pulse
#[derive(Error, Debug)]
pub enum PulseError {
    /// Track failed validation (empty url, bad metadata)
    #[error("Invalid track {id}: {reason}")]
    InvalidTrack {
        /// Offending track
        id: TrackId,
        /// What failed
        reason: String,
    },
}

impl PulseError {
    /// Create an invalid track error
    pub fn invalid_track(id: &TrackId, reason: impl Into<String>) -> Self {
        Self::InvalidTrack {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_track_message_names_the_track() {
        let err = PulseError::invalid_track(&TrackId::new("abc"), "empty url");
        assert_eq!(err.to_string(), "Invalid track abc: empty url");
    }
}
