//! Pulse - Media Playback
//!
//! Platform-agnostic playback control for the Pulse feed, music/podcast
//! player and reels.
//!
//! This crate provides:
//! - [`MediaController`]: one transport (load, play, pause, seek, next,
//!   previous, stop) over one exclusively owned media element
//! - [`AutoplayCoordinator`]: at most one playing video among the reels in a
//!   scrolling feed, driven by visibility ratios
//! - Queue navigation with repeat modes
//! - Volume control (logarithmic, 0-100%, mute/unmute)
//! - Engagement notifications (play, like, download)
//!
//! # Architecture
//!
//! `pulse-playback` does not know about any rendering framework. The native
//! element is reached through the [`MediaElement`] trait; everything the
//! element reports asynchronously comes back as a [`MediaSignal`] tagged
//! with the source it belongs to, so results for a replaced source are
//! discarded instead of corrupting state.
//!
//! The `wasm` feature provides a `MediaElement` over a browser
//! `HTMLMediaElement` and a JavaScript-facing player.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use pulse_core::Track;
//! use pulse_playback::{MediaController, PlayerConfig, PlayerState, SimulatedElement};
//!
//! let (element, browser) = SimulatedElement::auto();
//! let mut player = MediaController::new(element, PlayerConfig::default());
//!
//! player
//!     .play_queue(
//!         vec![
//!             Track::new("t1", "https://cdn.example.com/t1.mp3", "First"),
//!             Track::new("t2", "https://cdn.example.com/t2.mp3", "Second"),
//!         ],
//!         0,
//!     )
//!     .unwrap();
//!
//! // Apply what the element reported (metadata loaded, play confirmed)
//! player.process_signals();
//! assert_eq!(player.state(), PlayerState::Playing);
//!
//! // The track ends, the controller advances on its own
//! browser.end();
//! player.process_signals();
//! assert_eq!(player.current_track().unwrap().id.as_str(), "t2");
//! ```
//!
//! # Example: Reel Autoplay
//!
//! ```rust
//! use pulse_core::{MediaKind, Track, TrackId};
//! use pulse_playback::{AutoplayCoordinator, SimulatedElement};
//!
//! let mut feed = AutoplayCoordinator::default();
//! for id in ["r1", "r2"] {
//!     let reel = Track::new(id, format!("https://cdn.example.com/{id}.mp4"), id)
//!         .with_kind(MediaKind::Video);
//!     let (element, _browser) = SimulatedElement::auto();
//!     feed.register(&reel, element).unwrap();
//! }
//!
//! feed.on_visibility_change(&TrackId::new("r1"), 0.9);
//! feed.on_visibility_change(&TrackId::new("r2"), 0.7);
//!
//! assert_eq!(feed.active(), Some(&TrackId::new("r2")));
//! assert_eq!(feed.playing_count(), 1);
//! ```

mod autoplay;
mod controller;
mod element;
mod error;
mod events;
mod notify;
mod queue;
mod signal;
mod sim;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use autoplay::{AutoplayCoordinator, OverlayKind};
pub use controller::MediaController;
pub use element::MediaElement;
pub use error::{PlaybackError, Result};
pub use events::{AutoplayEvent, PlaybackEvent};
pub use notify::{Engagement, EngagementCounters, TransportListener};
pub use queue::Queue;
pub use signal::{
    MediaErrorKind, MediaSignal, PlayRejection, PlayRequest, RequestId, SignalSender, SourceId,
};
pub use sim::{
    ElementCall, PlayPolicy, SimBehavior, SimHandle, SimulatedElement, DEFAULT_SIM_DURATION,
};
pub use types::{AutoplayConfig, PlaybackStatus, PlayerConfig, PlayerState, RepeatMode};
pub use volume::Volume;
