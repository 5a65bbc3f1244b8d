//! Scripted reel feed scroll
//!
//! Scrolls a virtualized feed from the first reel to the last. Only reels
//! within `window` reel heights of the viewport are rendered (registered);
//! the visible fraction of each rendered reel is fed to the coordinator at
//! every scroll step, like an intersection observer would.

use pulse_core::{Track, TrackId};
use pulse_playback::{
    AutoplayCoordinator, AutoplayEvent, OverlayKind, PlayPolicy, SimHandle, SimulatedElement,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::{Result, SimError};

/// Per-run options from the command line
#[derive(Debug, Clone)]
pub struct ReelOptions {
    /// Overrides the configured scroll step
    pub step: Option<f64>,
    /// Open the comments sheet once this reel (0-based) becomes active
    pub comments_at: Option<usize>,
    /// Reels rendered on each side of the viewport
    pub window: usize,
}

impl Default for ReelOptions {
    fn default() -> Self {
        Self {
            step: None,
            comments_at: None,
            window: 2,
        }
    }
}

/// Outcome of a reel scroll
#[derive(Debug, Clone, Serialize)]
pub struct ReelReport {
    /// Every event the coordinator emitted, in order
    pub events: Vec<AutoplayEvent>,
    /// Reels in the order they became active
    pub activations: Vec<TrackId>,
    /// Most reels wanting playback at once, sampled after every step
    pub max_playing: usize,
    /// Active reel when the scroll stopped
    pub final_active: Option<TrackId>,
    /// Scroll steps taken
    pub steps: usize,
    /// Simulated taps needed to get past autoplay refusals
    pub gestures: usize,
}

struct Feed<'a> {
    config: &'a SimConfig,
    reels: Vec<Track>,
    coordinator: AutoplayCoordinator<SimulatedElement>,
    rendered: Vec<Option<SimHandle>>,
}

impl Feed<'_> {
    fn policy(&self) -> PlayPolicy {
        if self.config.session.autoplay_allowed {
            PlayPolicy::Allow
        } else {
            PlayPolicy::Deny
        }
    }

    /// Render reels entering the window and drop those leaving it
    fn sync_window(&mut self, offset: f64, window: usize) -> Result<()> {
        let policy = self.policy();
        for (index, reel) in self.reels.iter().enumerate() {
            let within = (index as f64 - offset).abs() <= window as f64;
            match (self.rendered[index].is_some(), within) {
                (false, true) => {
                    let (element, handle) = SimulatedElement::auto();
                    if let Some(duration) = reel.duration_hint {
                        handle.set_duration(&reel.url, duration);
                    }
                    handle.set_play_policy(policy);
                    for url in &self.config.session.broken_urls {
                        handle.mark_broken(url);
                    }
                    self.coordinator.register(reel, element)?;
                    self.rendered[index] = Some(handle);
                    debug!(id = %reel.id, "Reel rendered");
                }
                (true, false) => {
                    self.coordinator.unregister(&reel.id);
                    self.rendered[index] = None;
                    debug!(id = %reel.id, "Reel recycled");
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn observe(&mut self, offset: f64) {
        for (index, reel) in self.reels.iter().enumerate() {
            if self.rendered[index].is_some() {
                let ratio = (1.0 - (index as f64 - offset).abs()).max(0.0);
                self.coordinator.on_visibility_change(&reel.id, ratio);
            }
        }
    }

    /// Forward queued element signals, like the browser event loop
    fn pump(&mut self) {
        // Looping reels queue new signals while earlier ones are handled
        loop {
            let mut delivered = 0;
            for (index, reel) in self.reels.iter().enumerate() {
                let Some(handle) = &self.rendered[index] else {
                    continue;
                };
                for signal in handle.take_signals() {
                    self.coordinator.handle_signal(&reel.id, signal);
                    delivered += 1;
                }
            }
            if delivered == 0 {
                break;
            }
        }
    }

    fn dwell(&mut self, seconds: f64) {
        for handle in self.rendered.iter().flatten() {
            handle.tick(seconds);
        }
        self.pump();
    }

    fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.reels.iter().position(|r| &r.id == id)
    }

    /// Tap a blocked active reel, which counts as a user gesture
    fn tap_if_blocked(&mut self) -> bool {
        let Some(active) = self.coordinator.active().cloned() else {
            return false;
        };
        if !self.coordinator.is_blocked(&active) {
            return false;
        }
        let Some(handle) = self.index_of(&active).and_then(|i| self.rendered[i].clone()) else {
            return false;
        };

        debug!(id = %active, "Simulating tap on blocked reel");
        handle.set_play_policy(PlayPolicy::Allow);
        self.coordinator.tap(&active);
        self.pump();
        handle.set_play_policy(self.policy());
        true
    }
}

/// Scroll through the configured reel feed
pub fn run_reels(config: &SimConfig, options: &ReelOptions) -> Result<ReelReport> {
    let step = options.step.unwrap_or(config.reels.scroll_step);
    if !(step.is_finite() && step > 0.0) {
        return Err(SimError::Session(format!(
            "scroll step must be positive, got {step}"
        )));
    }

    let reels = config.reel_feed();
    let last = reels.len().saturating_sub(1) as f64;
    let mut feed = Feed {
        config,
        rendered: vec![None; reels.len()],
        reels,
        coordinator: AutoplayCoordinator::new(config.autoplay.clone()),
    };

    info!(reels = feed.reels.len(), step, "Starting reel scroll");

    let mut events = Vec::new();
    let mut activations = Vec::new();
    let mut max_playing = 0;
    let mut gestures = 0;
    let mut steps = 0;
    let mut comments_shown = false;
    let mut offset = 0.0;

    while offset <= last + f64::EPSILON {
        feed.sync_window(offset, options.window)?;
        feed.observe(offset);
        feed.pump();

        if feed.tap_if_blocked() {
            gestures += 1;
        }

        let active_index = feed
            .coordinator
            .active()
            .cloned()
            .and_then(|id| feed.index_of(&id));
        if !comments_shown && active_index.is_some() && active_index == options.comments_at {
            feed.coordinator.open_overlay(OverlayKind::Comments);
            max_playing = max_playing.max(feed.coordinator.playing_count());
            feed.dwell(config.reels.dwell_seconds);
            feed.coordinator.close_overlay(OverlayKind::Comments);
            feed.pump();
            comments_shown = true;
        }

        feed.dwell(config.reels.dwell_seconds);
        max_playing = max_playing.max(feed.coordinator.playing_count());

        for event in feed.coordinator.drain_events() {
            if let AutoplayEvent::Activated { id } = &event {
                activations.push(id.clone());
            }
            events.push(event);
        }

        steps += 1;
        offset += step;
    }

    let final_active = feed.coordinator.active().cloned();
    info!(steps, activations = activations.len(), max_playing, "Reel scroll finished");

    Ok(ReelReport {
        events,
        activations,
        max_playing,
        final_active,
        steps,
        gestures,
    })
}
