//! Reel autoplay coordinator
//!
//! Among the video elements of a vertically scrolling feed, keeps at most one
//! playing: the item most recently scrolled past the visibility threshold.
//! The visibility observer is abstracted to
//! [`on_visibility_change`](AutoplayCoordinator::on_visibility_change) so the
//! coordinator runs without a viewport.

use std::collections::{BTreeSet, HashMap};

use pulse_core::{Track, TrackId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    element::MediaElement,
    error::Result,
    events::AutoplayEvent,
    signal::{MediaSignal, PlayRejection, PlayRequest, RequestId, SourceId},
    types::AutoplayConfig,
};

/// Sheets that cover the feed and interrupt playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Comments,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Paused,
    Requested(PlayRequest),
    Playing,
}

struct Item<E> {
    element: E,
    source: SourceId,
    ratio: f64,
    intent: Intent,
    blocked: bool,
}

impl<E> Item<E> {
    fn wants_playback(&self) -> bool {
        self.intent != Intent::Paused
    }
}

/// Keeps at most one reel playing
pub struct AutoplayCoordinator<E: MediaElement> {
    config: AutoplayConfig,
    items: HashMap<TrackId, Item<E>>,
    active: Option<TrackId>,
    overlays: BTreeSet<OverlayKind>,
    resume_on_close: Option<TrackId>,
    next_source: u64,
    next_request: u64,
    pending_events: Vec<AutoplayEvent>,
}

impl<E: MediaElement> AutoplayCoordinator<E> {
    /// Create an empty coordinator
    pub fn new(config: AutoplayConfig) -> Self {
        Self {
            config,
            items: HashMap::new(),
            active: None,
            overlays: BTreeSet::new(),
            resume_on_close: None,
            next_source: 0,
            next_request: 0,
            pending_events: Vec::new(),
        }
    }

    /// Start tracking a rendered reel
    ///
    /// Attaches the video's url to its element. Re-registering an id replaces
    /// the previous element.
    pub fn register(&mut self, track: &Track, mut element: E) -> Result<()> {
        track.validate()?;
        self.unregister(&track.id);

        self.next_source += 1;
        let source = SourceId(self.next_source);
        element.set_source(source, &track.url);

        self.items.insert(
            track.id.clone(),
            Item {
                element,
                source,
                ratio: 0.0,
                intent: Intent::Paused,
                blocked: false,
            },
        );
        debug!(id = %track.id, %source, "Registered reel");
        Ok(())
    }

    /// Stop tracking a reel (it scrolled out of the rendered window)
    ///
    /// The element is paused, its source released, and it is handed back.
    pub fn unregister(&mut self, id: &TrackId) -> Option<E> {
        let mut item = self.items.remove(id)?;
        item.element.pause();
        item.element.clear_source();

        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        if self.resume_on_close.as_ref() == Some(id) {
            self.resume_on_close = None;
        }
        debug!(%id, "Unregistered reel");
        Some(item.element)
    }

    /// Visibility observer callback
    ///
    /// Only the latest ratio per item matters. Crossing the threshold makes
    /// the item active: every other item is paused first, then it is played.
    /// Dropping below the threshold pauses the active item. Ratios for
    /// unknown ids are ignored.
    pub fn on_visibility_change(&mut self, id: &TrackId, ratio: f64) {
        let threshold = self.config.visibility_threshold;
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };

        let Some(item) = self.items.get_mut(id) else {
            debug!(%id, ratio, "Visibility change for untracked reel ignored");
            return;
        };

        let was_visible = item.ratio >= threshold;
        item.ratio = ratio;
        let visible = ratio >= threshold;
        let is_active = self.active.as_ref() == Some(id);

        if visible && !is_active && (!was_visible || self.active.is_none()) {
            self.activate(id);
        } else if !visible && is_active {
            self.active = None;
            if self.resume_on_close.as_ref() == Some(id) {
                self.resume_on_close = None;
            }
            self.pause_item(id);
            self.pending_events
                .push(AutoplayEvent::Deactivated { id: id.clone() });
        }
    }

    /// User tapped a reel: toggle it, treating the tap as a user gesture
    ///
    /// Under an open overlay the reel becomes active and starts once the
    /// overlay closes.
    pub fn tap(&mut self, id: &TrackId) {
        let Some(item) = self.items.get(id) else {
            return;
        };

        if item.wants_playback() {
            self.pause_item(id);
            if self.resume_on_close.as_ref() == Some(id) {
                self.resume_on_close = None;
            }
        } else {
            if self.active.as_ref() != Some(id) {
                self.active = Some(id.clone());
                self.pending_events
                    .push(AutoplayEvent::Activated { id: id.clone() });
            }
            self.pause_others(id);
            if let Some(item) = self.items.get_mut(id) {
                item.blocked = false;
            }
            if self.overlays.is_empty() {
                self.play_item(id);
            } else {
                self.resume_on_close = Some(id.clone());
            }
        }
    }

    /// A sheet opened over the feed
    ///
    /// The active item is paused regardless of visibility and remembered for
    /// resumption.
    pub fn open_overlay(&mut self, kind: OverlayKind) {
        let first = self.overlays.is_empty();
        if !self.overlays.insert(kind) || !first {
            return;
        }

        if let Some(active) = self.active.clone() {
            if self.items.get(&active).is_some_and(Item::wants_playback) {
                self.resume_on_close = Some(active.clone());
                self.pause_item(&active);
            }
        }
    }

    /// A sheet closed
    ///
    /// When the last sheet closes, the remembered item resumes if it is still
    /// tracked, still active and still visible.
    pub fn close_overlay(&mut self, kind: OverlayKind) {
        if !self.overlays.remove(&kind) || !self.overlays.is_empty() {
            return;
        }

        let Some(id) = self.resume_on_close.take() else {
            return;
        };
        if !self.config.resume_after_overlay || self.active.as_ref() != Some(&id) {
            return;
        }

        let threshold = self.config.visibility_threshold;
        if self.items.get(&id).is_some_and(|item| item.ratio >= threshold) {
            self.play_item(&id);
        }
    }

    /// Apply a signal reported by an item's element
    ///
    /// Results for unregistered items, replaced sources and superseded play
    /// requests are ignored.
    pub fn handle_signal(&mut self, id: &TrackId, signal: MediaSignal) {
        let loop_videos = self.config.loop_videos;
        let is_active = self.active.as_ref() == Some(id);

        let Some(item) = self.items.get_mut(id) else {
            debug!(%id, "Signal for detached reel ignored");
            return;
        };
        if signal.source() != item.source {
            debug!(%id, "Signal for stale reel source ignored");
            return;
        }

        match signal {
            MediaSignal::PlayResolved { request } => {
                if item.intent == Intent::Requested(request) {
                    item.intent = Intent::Playing;
                } else {
                    debug!(%id, "Superseded play resolution ignored");
                }
            }
            MediaSignal::PlayRejected { request, rejection } => {
                if item.intent != Intent::Requested(request) {
                    debug!(%id, "Superseded play rejection ignored");
                    return;
                }
                item.intent = Intent::Paused;
                match rejection {
                    PlayRejection::NotAllowed => {
                        item.blocked = true;
                        self.pending_events
                            .push(AutoplayEvent::Blocked { id: id.clone() });
                    }
                    PlayRejection::Aborted => {}
                    other => warn!(%id, rejection = %other, "Reel play request rejected"),
                }
            }
            MediaSignal::Error { kind, .. } => {
                warn!(%id, error = %kind, "Reel source failed to load");
                item.intent = Intent::Paused;
            }
            MediaSignal::Ended { .. } => {
                item.intent = Intent::Paused;
                if loop_videos && is_active && self.overlays.is_empty() {
                    item.element.set_current_time(0.0);
                    self.play_item(id);
                }
            }
            MediaSignal::LoadedData { .. }
            | MediaSignal::DurationChange { .. }
            | MediaSignal::TimeUpdate { .. }
            | MediaSignal::Seeked { .. } => {}
        }
    }

    // ===== Queries =====

    /// Currently active item
    pub fn active(&self) -> Option<&TrackId> {
        self.active.as_ref()
    }

    /// Whether `play` has been requested (and not since paused) on the item
    pub fn is_playing(&self, id: &TrackId) -> bool {
        self.items.get(id).is_some_and(Item::wants_playback)
    }

    /// Whether the item's element confirmed playback
    pub fn is_confirmed_playing(&self, id: &TrackId) -> bool {
        self.items
            .get(id)
            .is_some_and(|item| item.intent == Intent::Playing)
    }

    /// Whether the item's autoplay was refused (needs "tap to play")
    pub fn is_blocked(&self, id: &TrackId) -> bool {
        self.items.get(id).is_some_and(|item| item.blocked)
    }

    /// Number of items that want playback; never more than one
    pub fn playing_count(&self) -> usize {
        self.items.values().filter(|i| i.wants_playback()).count()
    }

    /// Number of tracked items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any overlay is open
    pub fn overlay_open(&self) -> bool {
        !self.overlays.is_empty()
    }

    /// Read-only access to an item's element
    pub fn element(&self, id: &TrackId) -> Option<&E> {
        self.items.get(id).map(|item| &item.element)
    }

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<AutoplayEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    fn activate(&mut self, id: &TrackId) {
        self.active = Some(id.clone());
        self.pending_events
            .push(AutoplayEvent::Activated { id: id.clone() });
        self.pause_others(id);

        if self.overlays.is_empty() {
            self.play_item(id);
        } else {
            self.resume_on_close = Some(id.clone());
        }
    }

    fn pause_others(&mut self, keep: &TrackId) {
        let others: Vec<TrackId> = self
            .items
            .iter()
            .filter(|(id, item)| *id != keep && item.wants_playback())
            .map(|(id, _)| id.clone())
            .collect();

        for id in others {
            self.pause_item(&id);
        }
    }

    fn pause_item(&mut self, id: &TrackId) {
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        if !item.wants_playback() {
            return;
        }
        item.element.pause();
        item.intent = Intent::Paused;
        self.pending_events
            .push(AutoplayEvent::Paused { id: id.clone() });
    }

    fn play_item(&mut self, id: &TrackId) {
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        if item.wants_playback() {
            return;
        }

        self.next_request += 1;
        let request = PlayRequest {
            id: RequestId(self.next_request),
            source: item.source,
        };
        item.intent = Intent::Requested(request);
        item.element.request_play(request);
        self.pending_events
            .push(AutoplayEvent::PlayRequested { id: id.clone() });
    }
}

impl<E: MediaElement> Default for AutoplayCoordinator<E> {
    fn default() -> Self {
        Self::new(AutoplayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimHandle, SimulatedElement};
    use pulse_core::MediaKind;

    fn reel(id: &str) -> Track {
        Track::new(id, format!("https://cdn.pulse.test/reels/{id}.mp4"), id)
            .with_kind(MediaKind::Video)
    }

    fn feed(ids: &[&str]) -> (AutoplayCoordinator<SimulatedElement>, Vec<SimHandle>) {
        let mut coordinator = AutoplayCoordinator::default();
        let handles = ids
            .iter()
            .map(|id| {
                let (element, handle) = SimulatedElement::manual();
                coordinator.register(&reel(id), element).unwrap();
                handle
            })
            .collect();
        (coordinator, handles)
    }

    #[test]
    fn crossing_threshold_activates_and_plays() {
        let (mut coordinator, handles) = feed(&["r1"]);
        let r1 = TrackId::new("r1");

        coordinator.on_visibility_change(&r1, 0.3);
        assert!(coordinator.active().is_none());

        coordinator.on_visibility_change(&r1, 0.6);
        assert_eq!(coordinator.active(), Some(&r1));
        assert!(coordinator.is_playing(&r1));
        assert_eq!(handles[0].pending_plays(), 1);
    }

    #[test]
    fn repeated_visibility_is_idempotent() {
        let (mut coordinator, handles) = feed(&["r1"]);
        let r1 = TrackId::new("r1");

        coordinator.on_visibility_change(&r1, 0.7);
        coordinator.on_visibility_change(&r1, 0.9);
        coordinator.on_visibility_change(&r1, 1.0);
        assert_eq!(handles[0].pending_plays(), 1);
    }

    #[test]
    fn dropping_below_threshold_pauses() {
        let (mut coordinator, _handles) = feed(&["r1"]);
        let r1 = TrackId::new("r1");

        coordinator.on_visibility_change(&r1, 0.8);
        coordinator.on_visibility_change(&r1, 0.2);
        assert!(coordinator.active().is_none());
        assert!(!coordinator.is_playing(&r1));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (mut coordinator, _handles) = feed(&["r1"]);
        coordinator.on_visibility_change(&TrackId::new("ghost"), 1.0);
        assert!(coordinator.active().is_none());
        assert_eq!(coordinator.playing_count(), 0);
    }

    #[test]
    fn unregister_releases_element_and_activity() {
        let (mut coordinator, handles) = feed(&["r1"]);
        let r1 = TrackId::new("r1");
        coordinator.on_visibility_change(&r1, 1.0);

        assert!(coordinator.unregister(&r1).is_some());
        assert!(coordinator.active().is_none());
        assert!(handles[0].attached_url().is_none());
    }

    #[test]
    fn rejected_autoplay_marks_blocked_and_tap_plays() {
        let (mut coordinator, handles) = feed(&["r1"]);
        let r1 = TrackId::new("r1");
        coordinator.on_visibility_change(&r1, 1.0);

        handles[0].reject_play(PlayRejection::NotAllowed);
        for signal in handles[0].take_signals() {
            coordinator.handle_signal(&r1, signal);
        }
        assert!(coordinator.is_blocked(&r1));
        assert!(!coordinator.is_playing(&r1));

        coordinator.tap(&r1);
        assert!(!coordinator.is_blocked(&r1));
        assert!(coordinator.is_playing(&r1));
    }

    #[test]
    fn ended_active_reel_loops() {
        let (mut coordinator, handles) = feed(&["r1"]);
        let r1 = TrackId::new("r1");
        coordinator.on_visibility_change(&r1, 1.0);
        handles[0].resolve_play();
        for signal in handles[0].take_signals() {
            coordinator.handle_signal(&r1, signal);
        }
        assert!(coordinator.is_confirmed_playing(&r1));

        handles[0].end();
        for signal in handles[0].take_signals() {
            coordinator.handle_signal(&r1, signal);
        }
        assert!(coordinator.is_playing(&r1));
        assert_eq!(handles[0].pending_plays(), 1);
        assert_eq!(handles[0].current_time(), 0.0);
    }
}
