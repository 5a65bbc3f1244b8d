//! Engagement notifications
//!
//! Play, like and download counters live outside the player. They are told
//! about transport events through [`TransportListener`] and nothing waits for
//! them.

use pulse_core::{Track, TrackId};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;

/// Fire-and-forget observer of transport events
///
/// All methods default to no-ops so listeners implement only what they need.
pub trait TransportListener {
    /// Playback of `track` actually started
    fn on_play(&self, track: &Track) {
        let _ = track;
    }

    /// The user asked to download `track`
    fn on_download(&self, track: &Track) {
        let _ = track;
    }

    /// The user liked `track`
    fn on_like(&self, track: &Track) {
        let _ = track;
    }
}

/// Per-track engagement counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Engagement {
    pub plays: u64,
    pub downloads: u64,
    pub likes: u64,
}

/// In-memory counters, the listener the feed and catalog views share
#[derive(Debug, Default)]
pub struct EngagementCounters {
    counts: RefCell<HashMap<TrackId, Engagement>>,
}

impl EngagementCounters {
    /// Create empty counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for a track (zero if never seen)
    pub fn get(&self, id: &TrackId) -> Engagement {
        self.counts.borrow().get(id).copied().unwrap_or_default()
    }

    fn bump(&self, id: &TrackId, apply: impl FnOnce(&mut Engagement)) {
        apply(self.counts.borrow_mut().entry(id.clone()).or_default());
    }
}

impl TransportListener for EngagementCounters {
    fn on_play(&self, track: &Track) {
        self.bump(&track.id, |e| e.plays += 1);
    }

    fn on_download(&self, track: &Track) {
        self.bump(&track.id, |e| e.downloads += 1);
    }

    fn on_like(&self, track: &Track) {
        self.bump(&track.id, |e| e.likes += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_track() {
        let counters = EngagementCounters::new();
        let a = Track::new("a", "https://cdn/a.mp3", "A");
        let b = Track::new("b", "https://cdn/b.mp3", "B");

        counters.on_play(&a);
        counters.on_play(&a);
        counters.on_like(&b);
        counters.on_download(&a);

        assert_eq!(
            counters.get(&a.id),
            Engagement {
                plays: 2,
                downloads: 1,
                likes: 0
            }
        );
        assert_eq!(counters.get(&b.id).likes, 1);
        assert_eq!(counters.get(&TrackId::new("zzz")), Engagement::default());
    }
}
