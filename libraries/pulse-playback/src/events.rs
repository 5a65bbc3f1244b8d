//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are queued by
//! the controller and coordinator and drained by the UI:
//! - State changes (loading/play/pause/end/idle)
//! - Track changes
//! - Autoplay refusals ("tap to play")
//! - Source errors

use pulse_core::TrackId;
use serde::{Deserialize, Serialize};

use crate::types::PlayerState;

/// Events emitted by the media controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A different source was attached
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track played to its end
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update, emitted on seek/stop or on request
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration (0 when unknown)
        duration_ms: u64,
    },

    /// The element refused to start without a user gesture
    PlaybackBlocked {
        /// Track waiting for "tap to play"
        track_id: TrackId,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        /// New queue length
        length: usize,
        /// Cursor position
        index: Option<usize>,
    },

    /// The current source failed to load
    Error {
        /// Track whose source failed
        track_id: Option<TrackId>,
        /// Error message
        message: String,
    },
}

/// Events emitted by the reel autoplay coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoplayEvent {
    /// Item became the active (eligible to play) item
    Activated { id: TrackId },

    /// Item lost activity without another taking over
    Deactivated { id: TrackId },

    /// `play` was requested on the item's element
    PlayRequested { id: TrackId },

    /// The item's element was paused
    Paused { id: TrackId },

    /// The item's autoplay was refused
    Blocked { id: TrackId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_tags() {
        let event = PlaybackEvent::StateChanged {
            state: PlayerState::Playing,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"StateChanged":{"state":"Playing"}}"#);

        let back: PlaybackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
