//! Simulated media element
//!
//! A deterministic stand-in for a browser media element. The element half is
//! handed to a controller or coordinator; the [`SimHandle`] half plays the
//! role of the browser: it resolves or rejects play requests, reports
//! progress, ends media and raises errors on demand.
//!
//! In [`SimBehavior::auto`] mode the element answers by itself: attaching a
//! source reports `LoadedData` (or `Error` for urls marked broken) and play
//! requests resolve immediately (or are refused when autoplay is denied).
//! Answers are queued, so they are only applied when the owner processes
//! signals, just like promise callbacks on an event loop.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::element::MediaElement;
use crate::signal::{
    MediaErrorKind, MediaSignal, PlayRejection, PlayRequest, SignalSender, SourceId,
};

/// Duration reported for urls without an explicit one
pub const DEFAULT_SIM_DURATION: f64 = 180.0;

/// How play requests are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPolicy {
    /// Keep requests pending until the handle answers them
    Hold,
    /// Resolve immediately
    Allow,
    /// Reject with `NotAllowed` (autoplay blocked)
    Deny,
}

/// Simulated browser behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimBehavior {
    /// Report `LoadedData`/`Error` as soon as a source is attached
    pub auto_load: bool,
    /// Play request handling
    pub play: PlayPolicy,
}

impl SimBehavior {
    /// Everything answered by hand through the handle
    pub fn manual() -> Self {
        Self {
            auto_load: false,
            play: PlayPolicy::Hold,
        }
    }

    /// Loads and plays succeed on their own
    pub fn auto() -> Self {
        Self {
            auto_load: true,
            play: PlayPolicy::Allow,
        }
    }
}

/// Command received by the simulated element, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    Attach,
    Detach,
    SetSource { source: SourceId, url: String },
    ClearSource,
    RequestPlay(PlayRequest),
    Pause,
    SetCurrentTime(f64),
    SetVolume(f64),
}

#[derive(Debug)]
struct SimState {
    behavior: SimBehavior,
    sender: Option<SignalSender>,
    outbox: Vec<MediaSignal>,
    calls: Vec<ElementCall>,
    source: Option<(SourceId, String)>,
    duration: f64,
    current_time: f64,
    playing: bool,
    volume: f64,
    pending: VecDeque<PlayRequest>,
    durations: HashMap<String, f64>,
    broken: HashSet<String>,
}

impl SimState {
    fn emit(&mut self, signal: MediaSignal) {
        match &self.sender {
            Some(sender) => {
                sender.send(signal);
            }
            None => self.outbox.push(signal),
        }
    }

    fn current_source(&self) -> Option<SourceId> {
        self.source.as_ref().map(|(id, _)| *id)
    }

    fn is_broken(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|(_, url)| self.broken.contains(url))
    }
}

/// Simulated media element, owned by a controller or coordinator
#[derive(Debug)]
pub struct SimulatedElement {
    state: Rc<RefCell<SimState>>,
}

/// Browser-side control of a [`SimulatedElement`]
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedElement {
    /// Create an element and its handle
    pub fn new(behavior: SimBehavior) -> (Self, SimHandle) {
        let state = Rc::new(RefCell::new(SimState {
            behavior,
            sender: None,
            outbox: Vec::new(),
            calls: Vec::new(),
            source: None,
            duration: 0.0,
            current_time: 0.0,
            playing: false,
            volume: 1.0,
            pending: VecDeque::new(),
            durations: HashMap::new(),
            broken: HashSet::new(),
        }));

        (
            Self {
                state: Rc::clone(&state),
            },
            SimHandle { state },
        )
    }

    /// Element answered entirely by hand
    pub fn manual() -> (Self, SimHandle) {
        Self::new(SimBehavior::manual())
    }

    /// Element that loads and plays on its own
    pub fn auto() -> (Self, SimHandle) {
        Self::new(SimBehavior::auto())
    }
}

impl MediaElement for SimulatedElement {
    fn attach(&mut self, signals: SignalSender) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::Attach);
        state.sender = Some(signals);
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::Detach);
        state.sender = None;
    }

    fn set_source(&mut self, source: SourceId, url: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::SetSource {
            source,
            url: url.to_string(),
        });

        state.source = Some((source, url.to_string()));
        state.playing = false;
        state.current_time = 0.0;
        state.duration = state
            .durations
            .get(url)
            .copied()
            .unwrap_or(DEFAULT_SIM_DURATION);

        if !state.behavior.auto_load {
            return;
        }

        // A real element aborts plays that were waiting on the old source
        while let Some(request) = state.pending.pop_front() {
            state.emit(MediaSignal::PlayRejected {
                request,
                rejection: PlayRejection::Aborted,
            });
        }

        if state.is_broken() {
            state.emit(MediaSignal::Error {
                source,
                kind: MediaErrorKind::SourceNotSupported,
            });
        } else {
            let duration = state.duration;
            state.emit(MediaSignal::LoadedData { source, duration });
        }
    }

    fn clear_source(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::ClearSource);
        state.source = None;
        state.playing = false;
        state.current_time = 0.0;
        state.duration = 0.0;
    }

    fn request_play(&mut self, request: PlayRequest) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::RequestPlay(request));

        let policy = state.behavior.play;
        match policy {
            PlayPolicy::Hold => state.pending.push_back(request),
            PlayPolicy::Deny => state.emit(MediaSignal::PlayRejected {
                request,
                rejection: PlayRejection::NotAllowed,
            }),
            PlayPolicy::Allow => {
                if state.current_source() == Some(request.source) && !state.is_broken() {
                    state.playing = true;
                    state.emit(MediaSignal::PlayResolved { request });
                } else {
                    state.emit(MediaSignal::PlayRejected {
                        request,
                        rejection: PlayRejection::NotSupported,
                    });
                }
            }
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::Pause);
        state.playing = false;
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::SetCurrentTime(seconds));
        state.current_time = seconds;

        if state.behavior.auto_load {
            if let Some(source) = state.current_source() {
                state.emit(MediaSignal::Seeked {
                    source,
                    current_time: seconds,
                });
            }
        }
    }

    fn set_volume(&mut self, gain: f64) {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::SetVolume(gain));
        state.volume = gain;
    }
}

impl SimHandle {
    /// Duration to report when `url` is attached
    pub fn set_duration(&self, url: &str, seconds: f64) {
        self.state
            .borrow_mut()
            .durations
            .insert(url.to_string(), seconds);
    }

    /// Make `url` fail to load
    pub fn mark_broken(&self, url: &str) {
        self.state.borrow_mut().broken.insert(url.to_string());
    }

    /// Change how play requests are answered from now on
    pub fn set_play_policy(&self, policy: PlayPolicy) {
        self.state.borrow_mut().behavior.play = policy;
    }

    /// Resolve the oldest pending play request
    ///
    /// Resolves even when the request belongs to a source that has been
    /// replaced, which is how stale promise callbacks look to the owner.
    pub fn resolve_play(&self) -> Option<PlayRequest> {
        let mut state = self.state.borrow_mut();
        let request = state.pending.pop_front()?;
        if state.current_source() == Some(request.source) {
            state.playing = true;
        }
        state.emit(MediaSignal::PlayResolved { request });
        Some(request)
    }

    /// Reject the oldest pending play request
    pub fn reject_play(&self, rejection: PlayRejection) -> Option<PlayRequest> {
        let mut state = self.state.borrow_mut();
        let request = state.pending.pop_front()?;
        state.emit(MediaSignal::PlayRejected { request, rejection });
        Some(request)
    }

    /// Report `LoadedData` for the attached source
    pub fn load(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(source) = state.current_source() else {
            return false;
        };
        let duration = state.duration;
        state.emit(MediaSignal::LoadedData { source, duration });
        true
    }

    /// Advance a playing element by `seconds`
    ///
    /// Reports `TimeUpdate`, then `Ended` when the end is reached. Returns
    /// `true` if the media ended.
    pub fn tick(&self, seconds: f64) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(source) = state.current_source() else {
            return false;
        };
        if !state.playing {
            return false;
        }

        let end = state.duration;
        state.current_time = (state.current_time + seconds).min(end);
        let current_time = state.current_time;
        state.emit(MediaSignal::TimeUpdate {
            source,
            current_time,
        });

        if current_time >= end {
            state.playing = false;
            state.emit(MediaSignal::Ended { source });
            return true;
        }
        false
    }

    /// Report `Ended` for the attached source
    pub fn end(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(source) = state.current_source() else {
            return false;
        };
        state.playing = false;
        state.current_time = state.duration;
        state.emit(MediaSignal::Ended { source });
        true
    }

    /// Report a load error for the attached source
    pub fn fail(&self, kind: MediaErrorKind) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(source) = state.current_source() else {
            return false;
        };
        state.playing = false;
        state.emit(MediaSignal::Error { source, kind });
        true
    }

    /// Signals produced while no subscriber was attached
    pub fn take_signals(&self) -> Vec<MediaSignal> {
        std::mem::take(&mut self.state.borrow_mut().outbox)
    }

    /// Commands received so far
    pub fn calls(&self) -> Vec<ElementCall> {
        self.state.borrow().calls.clone()
    }

    /// Forget recorded commands
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Url currently attached
    pub fn attached_url(&self) -> Option<String> {
        self.state.borrow().source.as_ref().map(|(_, url)| url.clone())
    }

    /// Source id currently attached
    pub fn source(&self) -> Option<SourceId> {
        self.state.borrow().current_source()
    }

    /// Whether the element is producing output
    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    /// Element playhead
    pub fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    /// Element gain
    pub fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    /// Play requests waiting for an answer
    pub fn pending_plays(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Whether a subscriber is attached
    pub fn is_attached(&self) -> bool {
        self.state.borrow().sender.is_some()
    }
}
