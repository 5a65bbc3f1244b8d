//! Platform-agnostic media element trait
//!
//! Abstracts the native `<audio>`/`<video>` element (or any player backend)
//! behind the handful of operations the controller needs.

use crate::signal::{PlayRequest, SignalSender, SourceId};

/// Platform-agnostic media element
///
/// Implementors forward commands to the real element and report everything
/// asynchronous back as [`crate::MediaSignal`]s through the sender passed to
/// [`attach`](MediaElement::attach).
///
/// A controller takes exclusive ownership of its element. Nothing else may
/// call these methods while the controller is alive.
pub trait MediaElement {
    /// Subscribe to native events
    ///
    /// Called once when a controller takes ownership. Signals must be tagged
    /// with the `SourceId` most recently passed to `set_source`.
    fn attach(&mut self, signals: SignalSender);

    /// Unsubscribe from native events
    ///
    /// Called when the owning controller is dropped.
    fn detach(&mut self);

    /// Attach a new media url
    ///
    /// Position resets to zero. Any play request still pending for the old
    /// source may be rejected or resolved later; the controller discards it.
    fn set_source(&mut self, source: SourceId, url: &str);

    /// Detach the current url and release its resources
    fn clear_source(&mut self);

    /// Ask the element to start playing
    ///
    /// The outcome arrives later as `PlayResolved` or `PlayRejected` carrying
    /// the same request.
    fn request_play(&mut self, request: PlayRequest);

    /// Pause immediately
    fn pause(&mut self);

    /// Move the playhead (seconds)
    fn set_current_time(&mut self, seconds: f64);

    /// Set output gain in `[0.0, 1.0]`
    fn set_volume(&mut self, gain: f64);
}
