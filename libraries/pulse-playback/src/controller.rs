//! Media controller - core orchestration
//!
//! Owns one media element and presents a single transport over it, no matter
//! how many surfaces (mini-player, full-screen player, feed cards) drive it.

use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};

use pulse_core::Track;
use tracing::{debug, info, warn};

use crate::{
    element::MediaElement,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    notify::TransportListener,
    queue::Queue,
    signal::{MediaErrorKind, MediaSignal, PlayRejection, PlayRequest, RequestId, SignalSender, SourceId},
    types::{PlaybackStatus, PlayerConfig, PlayerState, RepeatMode},
    volume::Volume,
};

/// Source currently attached to the element
#[derive(Debug, Clone)]
struct AttachedSource {
    id: SourceId,
    url: String,
}

/// Single-owner transport over a media element
///
/// Orchestrates:
/// - Source switching (tear down old, attach new, reset position)
/// - Asynchronous play requests and their stale results
/// - Seek clamping
/// - Queue navigation and auto-advance on end
/// - Volume and engagement notifications
///
/// There is exactly one controller per element. It is created by whoever
/// owns the player surface and passed by reference to the views that need
/// it; nothing else touches the element.
///
/// Native signals are queued by the element and applied by
/// [`process_signals`](Self::process_signals). Dropping the controller
/// unsubscribes from the element and releases its source.
pub struct MediaController<E: MediaElement> {
    element: E,
    signals: Receiver<MediaSignal>,

    // State
    state: PlayerState,
    current: Option<Track>,
    attached: Option<AttachedSource>,
    pending_play: Option<PlayRequest>,
    is_playing: bool,
    ready: bool,
    current_time: f64,
    duration: f64,
    needs_user_gesture: bool,
    last_error: Option<MediaErrorKind>,

    // Queue and settings
    queue: Queue,
    repeat: RepeatMode,
    volume: Volume,
    previous_restart_threshold: Option<f64>,

    // Id allocation
    next_source: u64,
    next_request: u64,

    listeners: Vec<Rc<dyn TransportListener>>,
    pending_events: Vec<PlaybackEvent>,
}

impl<E: MediaElement> MediaController<E> {
    /// Take ownership of `element` and subscribe to its signals
    pub fn new(mut element: E, config: PlayerConfig) -> Self {
        let (tx, rx) = channel();
        element.attach(SignalSender::new(tx));

        let volume = Volume::new(config.volume);
        element.set_volume(volume.gain());

        Self {
            element,
            signals: rx,
            state: PlayerState::Idle,
            current: None,
            attached: None,
            pending_play: None,
            is_playing: false,
            ready: false,
            current_time: 0.0,
            duration: 0.0,
            needs_user_gesture: false,
            last_error: None,
            queue: Queue::new(),
            repeat: config.repeat,
            volume,
            previous_restart_threshold: config.previous_restart_threshold,
            next_source: 0,
            next_request: 0,
            listeners: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    // ===== Sources =====

    /// Make `track` the current track
    ///
    /// A different url tears down the old source, attaches the new one and
    /// resets the position to zero. The same url leaves the source and
    /// position untouched.
    pub fn load(&mut self, track: Track) -> Result<()> {
        track.validate()?;

        if self
            .attached
            .as_ref()
            .is_some_and(|attached| attached.url == track.url)
        {
            debug!(track_id = %track.id, "Source already attached, keeping position");
            self.current = Some(track);
            self.sync_queue_cursor();
            return Ok(());
        }

        let previous_track_id = self.current.as_ref().map(|t| t.id.clone());
        self.teardown_source();

        self.next_source += 1;
        let source = SourceId(self.next_source);
        self.element.set_source(source, &track.url);
        self.attached = Some(AttachedSource {
            id: source,
            url: track.url.clone(),
        });

        self.current_time = 0.0;
        self.duration = track.duration_hint.unwrap_or(0.0);
        self.ready = false;
        self.needs_user_gesture = false;
        self.last_error = None;

        info!(track_id = %track.id, url = %track.url, %source, "Loading track");

        let track_id = track.id.clone();
        self.current = Some(track);
        self.sync_queue_cursor();
        self.set_state(PlayerState::Loading);
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id,
            previous_track_id,
        });

        Ok(())
    }

    /// Tear down the source and reset to an empty `Idle` controller
    pub fn close(&mut self) {
        self.teardown_source();
        self.current = None;
        self.queue.clear();
        self.current_time = 0.0;
        self.duration = 0.0;
        self.needs_user_gesture = false;
        self.last_error = None;
        self.set_state(PlayerState::Idle);
        self.emit_queue_changed();
    }

    /// Internal: pause and detach the attached source, forgetting any
    /// pending play request
    fn teardown_source(&mut self) {
        if self.attached.take().is_some() {
            self.element.pause();
            self.element.clear_source();
        }
        self.pending_play = None;
        self.is_playing = false;
        self.ready = false;
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// Issues an asynchronous play request; the state becomes `Playing` once
    /// the element confirms. Refusals never come back as errors: see
    /// [`PlaybackStatus::needs_user_gesture`].
    pub fn play(&mut self) -> Result<()> {
        let source = self
            .attached
            .as_ref()
            .map(|a| a.id)
            .ok_or(PlaybackError::NoTrackLoaded)?;

        if self.is_playing || self.pending_play.is_some() {
            return Ok(());
        }

        if self.state == PlayerState::Ended {
            self.element.set_current_time(0.0);
            self.current_time = 0.0;
        }

        self.next_request += 1;
        let request = PlayRequest {
            id: RequestId(self.next_request),
            source,
        };
        self.pending_play = Some(request);
        self.needs_user_gesture = false;
        self.element.request_play(request);

        Ok(())
    }

    /// Pause playback
    ///
    /// Also cancels interest in a play request that has not been answered.
    pub fn pause(&mut self) {
        if self.attached.is_none() {
            return;
        }

        self.element.pause();
        self.pending_play = None;
        self.is_playing = false;

        if self.state == PlayerState::Playing {
            self.set_state(PlayerState::Paused);
        }
    }

    /// Play if paused, pause if playing
    pub fn toggle(&mut self) -> Result<()> {
        if self.is_playing || self.pending_play.is_some() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Pause and rewind to zero, keeping the source attached
    pub fn stop(&mut self) {
        if self.attached.is_none() {
            return;
        }

        self.element.pause();
        self.element.set_current_time(0.0);
        self.pending_play = None;
        self.is_playing = false;
        self.current_time = 0.0;

        if matches!(self.state, PlayerState::Playing | PlayerState::Ended) {
            self.set_state(PlayerState::Paused);
        }
        self.emit_position_update();
    }

    // ===== Seek =====

    /// Seek to `seconds`, clamped into `[0, duration]`
    ///
    /// With an unknown duration only the lower bound applies.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        if self.attached.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }

        let position = clamp_position(seconds, self.duration);
        self.element.set_current_time(position);
        self.current_time = position;

        if self.state == PlayerState::Ended && position < self.duration {
            self.set_state(PlayerState::Paused);
        }
        self.emit_position_update();
        Ok(())
    }

    /// Seek relative to the current position
    pub fn seek_by(&mut self, delta: f64) -> Result<()> {
        self.seek(self.current_time + delta)
    }

    /// Seek to a fraction (0.0-1.0) of the duration
    pub fn seek_to_percent(&mut self, percent: f64) -> Result<()> {
        if self.attached.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if !has_known_duration(self.duration) {
            return Err(PlaybackError::InvalidOperation(
                "duration not known yet".to_string(),
            ));
        }

        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 1.0) };
        self.seek(self.duration * percent)
    }

    // ===== Queue Navigation =====

    /// Move to the next queue item and play it
    ///
    /// Returns `false` without doing anything at the end of the queue,
    /// unless `RepeatMode::All` wraps to the start.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<bool> {
        let wrap = self.repeat == RepeatMode::All;
        let Some(track) = self.queue.advance(wrap).cloned() else {
            debug!("No next item in queue");
            return Ok(false);
        };

        self.load(track)?;
        self.play()?;
        self.emit_queue_changed();
        Ok(true)
    }

    /// Move to the previous queue item and play it
    ///
    /// With a restart threshold configured and the position past it, the
    /// current track restarts instead and `false` is returned. At the start
    /// of the queue this is a no-op unless `RepeatMode::All` wraps.
    pub fn previous(&mut self) -> Result<bool> {
        if let Some(threshold) = self.previous_restart_threshold {
            if self.attached.is_some() && self.current_time > threshold {
                self.seek(0.0)?;
                return Ok(false);
            }
        }

        let wrap = self.repeat == RepeatMode::All;
        let Some(track) = self.queue.retreat(wrap).cloned() else {
            debug!("No previous item in queue");
            return Ok(false);
        };

        self.load(track)?;
        self.play()?;
        self.emit_queue_changed();
        Ok(true)
    }

    /// Jump to queue item `index` and play it
    pub fn skip_to(&mut self, index: usize) -> Result<()> {
        let track = self
            .queue
            .jump(index)
            .cloned()
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        self.load(track)?;
        self.play()?;
        self.emit_queue_changed();
        Ok(())
    }

    // ===== Queue Management =====

    /// Replace the queue without starting playback
    ///
    /// `start` only positions the cursor; nothing is loaded. Every track is
    /// validated first, and on any failure the old queue stays in place.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: Option<usize>) -> Result<()> {
        if let Some(index) = start {
            if index >= tracks.len() {
                return Err(PlaybackError::IndexOutOfBounds(index));
            }
        }
        for track in &tracks {
            track.validate()?;
        }

        self.queue.set(tracks, start);
        self.emit_queue_changed();
        Ok(())
    }

    /// Replace the queue and play item `start`
    pub fn play_queue(&mut self, tracks: Vec<Track>, start: usize) -> Result<()> {
        self.set_queue(tracks, Some(start))?;
        self.skip_to(start)
    }

    /// Append a track to the queue
    pub fn enqueue(&mut self, track: Track) -> Result<()> {
        track.validate()?;
        self.queue.push(track);
        self.emit_queue_changed();
        Ok(())
    }

    /// Remove queue item `index`
    ///
    /// The current track keeps playing even if it is the one removed.
    pub fn remove_from_queue(&mut self, index: usize) -> Result<Track> {
        let removed = self
            .queue
            .remove(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        self.emit_queue_changed();
        Ok(removed)
    }

    /// Clear the queue, leaving the current track loaded
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
    }

    /// Internal: keep the cursor on the current track when it is queued
    fn sync_queue_cursor(&mut self) {
        let Some(track) = &self.current else {
            return;
        };
        if self.queue.current().is_some_and(|t| t.id == track.id) {
            return;
        }
        if let Some(index) = self.queue.position_of(&track.id) {
            self.queue.jump(index);
        }
    }

    // ===== Repeat =====

    /// Set repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Get current repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    // ===== Volume =====

    /// Set volume (0-100)
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.apply_volume();
    }

    /// Get current volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Mute audio
    pub fn mute(&mut self) {
        self.volume.mute();
        self.apply_volume();
    }

    /// Unmute audio
    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.apply_volume();
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    fn apply_volume(&mut self) {
        self.element.set_volume(self.volume.gain());
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    // ===== Engagement =====

    /// Register a fire-and-forget transport listener
    pub fn add_listener(&mut self, listener: Rc<dyn TransportListener>) {
        self.listeners.push(listener);
    }

    /// Notify listeners that the current track was liked
    pub fn like(&self) -> Result<()> {
        let track = self.current.as_ref().ok_or(PlaybackError::NoTrackLoaded)?;
        for listener in &self.listeners {
            listener.on_like(track);
        }
        Ok(())
    }

    /// Notify listeners that the current track is being downloaded
    pub fn download(&self) -> Result<()> {
        let track = self.current.as_ref().ok_or(PlaybackError::NoTrackLoaded)?;
        for listener in &self.listeners {
            listener.on_download(track);
        }
        Ok(())
    }

    // ===== Signals =====

    /// Apply every signal the element has queued
    ///
    /// Returns how many signals were received (stale ones included).
    pub fn process_signals(&mut self) -> usize {
        let mut count = 0;
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_signal(signal);
            count += 1;
        }
        count
    }

    /// Apply one signal
    ///
    /// Signals for a replaced source, and play results for requests that
    /// are no longer pending, are discarded without touching state.
    pub fn handle_signal(&mut self, signal: MediaSignal) {
        match signal {
            MediaSignal::PlayResolved { request } => self.on_play_resolved(request),
            MediaSignal::PlayRejected { request, rejection } => {
                self.on_play_rejected(request, &rejection);
            }
            other => {
                if !self.is_current_source(other.source()) {
                    debug!(source = %other.source(), "Discarding signal for stale source");
                    return;
                }
                match other {
                    MediaSignal::LoadedData { duration, .. } => self.on_loaded_data(duration),
                    MediaSignal::DurationChange { duration, .. } => {
                        if has_known_duration(duration) {
                            self.duration = duration;
                        }
                    }
                    MediaSignal::TimeUpdate { current_time, .. }
                    | MediaSignal::Seeked { current_time, .. } => {
                        if current_time.is_finite() {
                            self.current_time = current_time.max(0.0);
                        }
                    }
                    MediaSignal::Ended { .. } => self.on_ended(),
                    MediaSignal::Error { kind, .. } => self.on_source_error(kind),
                    MediaSignal::PlayResolved { .. } | MediaSignal::PlayRejected { .. } => {}
                }
            }
        }
    }

    fn is_current_source(&self, source: SourceId) -> bool {
        self.attached.as_ref().is_some_and(|a| a.id == source)
    }

    fn on_play_resolved(&mut self, request: PlayRequest) {
        if self.pending_play != Some(request) || !self.is_current_source(request.source) {
            debug!(request = request.id.0, source = %request.source, "Discarding stale play resolution");
            return;
        }

        self.pending_play = None;
        self.is_playing = true;
        self.needs_user_gesture = false;
        self.set_state(PlayerState::Playing);

        if let Some(track) = &self.current {
            for listener in &self.listeners {
                listener.on_play(track);
            }
        }
    }

    fn on_play_rejected(&mut self, request: PlayRequest, rejection: &PlayRejection) {
        if self.pending_play != Some(request) || !self.is_current_source(request.source) {
            debug!(request = request.id.0, %rejection, "Discarding stale play rejection");
            return;
        }

        self.pending_play = None;
        self.is_playing = false;

        let track_id = self.current.as_ref().map(|t| t.id.clone());
        if rejection.is_expected() {
            debug!(?track_id, %rejection, "Play request refused");
        } else {
            warn!(?track_id, %rejection, "Play request rejected");
        }

        if *rejection == PlayRejection::NotAllowed {
            self.needs_user_gesture = true;
            if let Some(track_id) = track_id {
                self.pending_events
                    .push(PlaybackEvent::PlaybackBlocked { track_id });
            }
        }

        // A failed source never becomes ready; it stays paused on its error
        let state = if self.ready || self.last_error.is_some() {
            PlayerState::Paused
        } else {
            PlayerState::Loading
        };
        self.set_state(state);
    }

    fn on_loaded_data(&mut self, duration: f64) {
        if has_known_duration(duration) {
            self.duration = duration;
        }
        self.ready = true;

        if self.state == PlayerState::Loading && self.pending_play.is_none() {
            let state = if self.is_playing {
                PlayerState::Playing
            } else {
                PlayerState::Paused
            };
            self.set_state(state);
        }
    }

    fn on_ended(&mut self) {
        self.pending_play = None;
        self.is_playing = false;
        if has_known_duration(self.duration) {
            self.current_time = self.duration;
        }
        self.set_state(PlayerState::Ended);

        if let Some(track) = &self.current {
            self.pending_events.push(PlaybackEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }

        if self.repeat == RepeatMode::One {
            if let Err(e) = self.play() {
                warn!(error = %e, "Failed to restart track");
            }
            return;
        }

        match self.next() {
            Ok(true) => return,
            Ok(false) => info!("Queue exhausted"),
            Err(e) => warn!(error = %e, "Failed to advance after track ended"),
        }

        self.teardown_source();
        self.current = None;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.set_state(PlayerState::Idle);
    }

    fn on_source_error(&mut self, kind: MediaErrorKind) {
        let track_id = self.current.as_ref().map(|t| t.id.clone());
        warn!(?track_id, error = %kind, "Media source failed to load");

        self.pending_play = None;
        self.is_playing = false;
        self.last_error = Some(kind.clone());
        self.set_state(PlayerState::Paused);
        self.pending_events.push(PlaybackEvent::Error {
            track_id,
            message: kind.to_string(),
        });
    }

    // ===== State Queries =====

    /// Get current controller state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Whether the element has confirmed it is playing
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Get the current track
    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Url of the attached source
    pub fn attached_url(&self) -> Option<&str> {
        self.attached.as_ref().map(|a| a.url.as_str())
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        self.current_time
    }

    /// Duration in seconds (0 when unknown)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Queue cursor
    pub fn queue_index(&self) -> Option<usize> {
        self.queue.index()
    }

    /// Queued tracks
    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    /// Check if there is a next item
    pub fn has_next(&self) -> bool {
        self.queue
            .peek_next_index(self.repeat == RepeatMode::All)
            .is_some()
    }

    /// Check if there is a previous item
    pub fn has_previous(&self) -> bool {
        self.queue
            .peek_previous_index(self.repeat == RepeatMode::All)
            .is_some()
    }

    /// Autoplay was refused and the UI should offer "tap to play"
    pub fn needs_user_gesture(&self) -> bool {
        self.needs_user_gesture
    }

    /// Snapshot for rendering
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.state,
            is_playing: self.is_playing,
            current_time: self.current_time,
            duration: self.duration,
            current: self.current.clone(),
            queue: self.queue.tracks().to_vec(),
            queue_index: self.queue.index(),
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            repeat: self.repeat,
            needs_user_gesture: self.needs_user_gesture,
            last_error: self.last_error.clone(),
        }
    }

    /// Read-only access to the owned element
    pub fn element(&self) -> &E {
        &self.element
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Emit a position update event
    pub fn emit_position_update(&mut self) {
        if self.attached.is_some() {
            self.pending_events.push(PlaybackEvent::PositionUpdate {
                position_ms: seconds_to_ms(self.current_time),
                duration_ms: seconds_to_ms(self.duration),
            });
        }
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Player state changed");
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            index: self.queue.index(),
        });
    }
}

impl<E: MediaElement> Drop for MediaController<E> {
    fn drop(&mut self) {
        self.teardown_source();
        self.element.detach();
    }
}

fn has_known_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

/// Clamp a requested position into `[0, duration]`
///
/// NaN maps to zero; an unknown duration leaves the upper bound open.
pub(crate) fn clamp_position(seconds: f64, duration: f64) -> f64 {
    if seconds.is_nan() {
        return 0.0;
    }
    let lower = seconds.max(0.0);
    if has_known_duration(duration) {
        lower.min(duration)
    } else if lower.is_finite() {
        lower
    } else {
        0.0
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}
