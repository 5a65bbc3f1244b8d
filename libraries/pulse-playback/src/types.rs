//! Core types for playback control

use pulse_core::Track;
use serde::{Deserialize, Serialize};

use crate::signal::MediaErrorKind;

/// Controller state machine
///
/// ```text
/// Idle ──load──▶ Loading ──ready/play──▶ Playing ⇄ Paused
///                   ▲                       │
///                   └──── next in queue ── Ended ──queue exhausted──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No track loaded
    Idle,

    /// Source attached, not yet confirmed playable
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (or ready but never started)
    Paused,

    /// Reached the end of the current track
    Ended,
}

/// What happens at the ends of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// `next`/`previous` are no-ops at the boundaries
    #[default]
    Off,

    /// Wrap around to the opposite end
    All,

    /// Replay the current track when it ends
    One,
}

/// Configuration for the media controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 80)
    pub volume: u8,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// When set, `previous` past this many seconds restarts the current
    /// track instead of moving back (default: disabled)
    pub previous_restart_threshold: Option<f64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 80,
            repeat: RepeatMode::Off,
            previous_restart_threshold: None,
        }
    }
}

/// Configuration for the reel autoplay coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Intersection ratio at which an item becomes active (default: 0.6)
    pub visibility_threshold: f64,

    /// Resume the active item when the last overlay closes (default: true)
    pub resume_after_overlay: bool,

    /// Restart a video from zero when it ends while active (default: true)
    pub loop_videos: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.6,
            resume_after_overlay: true,
            loop_videos: true,
        }
    }
}

/// Snapshot of the controller, for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub state: PlayerState,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub current: Option<Track>,
    pub queue: Vec<Track>,
    pub queue_index: Option<usize>,
    pub volume: u8,
    pub is_muted: bool,
    pub repeat: RepeatMode,
    /// Autoplay was refused, the UI should offer "tap to play"
    pub needs_user_gesture: bool,
    pub last_error: Option<MediaErrorKind>,
}
