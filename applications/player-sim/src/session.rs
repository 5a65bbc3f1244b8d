//! Scripted music/podcast session
//!
//! Plays a queue to completion against a simulated browser element: the
//! element reports progress every tick, the controller advances on each
//! `ended`, and an autoplay refusal is answered with a simulated tap.

use std::rc::Rc;

use pulse_core::{Track, TrackId};
use pulse_playback::{
    Engagement, EngagementCounters, MediaController, PlayPolicy, PlaybackEvent, PlayerState, RepeatMode,
    SimulatedElement,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::{Result, SimError};

/// Per-run options from the command line
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Queue index to start from
    pub start: usize,
    /// Overrides the configured repeat mode
    pub repeat: Option<RepeatMode>,
    /// Like every track once it starts playing
    pub like_all: bool,
}

/// Outcome of a play session
#[derive(Debug, Clone, Serialize)]
pub struct PlayReport {
    /// Every event the controller emitted, in order
    pub events: Vec<PlaybackEvent>,
    /// Tracks that played to their end, in order
    pub finished: Vec<TrackId>,
    /// Simulated ticks elapsed
    pub ticks: usize,
    /// Simulated user taps needed to get past autoplay refusals
    pub gestures: usize,
    /// Tracks skipped because their source failed to load
    pub skipped: Vec<TrackId>,
    /// Confirmed plays, likes and downloads per track
    pub engagement: Vec<(TrackId, Engagement)>,
    /// Whether the queue ran out (false when stopped by the tick limit)
    pub completed: bool,
}

/// Play the configured audio catalog from `options.start`
pub fn run_play(config: &SimConfig, options: &PlayOptions) -> Result<PlayReport> {
    let tracks = config.audio_catalog();
    if options.start >= tracks.len() {
        return Err(SimError::Session(format!(
            "start index {} is past the end of a {}-track queue",
            options.start,
            tracks.len()
        )));
    }

    let (element, browser) = SimulatedElement::auto();
    for track in &tracks {
        if let Some(duration) = track.duration_hint {
            browser.set_duration(&track.url, duration);
        }
    }
    for url in &config.session.broken_urls {
        browser.mark_broken(url);
    }
    if !config.session.autoplay_allowed {
        browser.set_play_policy(PlayPolicy::Deny);
    }

    let mut player = MediaController::new(element, config.player.clone());
    if let Some(mode) = options.repeat {
        player.set_repeat(mode);
    }

    let counters = Rc::new(EngagementCounters::new());
    player.add_listener(counters.clone());

    info!(
        tracks = tracks.len(),
        start = options.start,
        repeat = ?player.repeat(),
        "Starting play session"
    );
    player.play_queue(tracks.clone(), options.start)?;

    let mut events = Vec::new();
    let mut finished = Vec::new();
    let mut gestures = 0;
    let mut skipped = Vec::new();
    let mut liked: Vec<TrackId> = Vec::new();
    let mut ticks = 0;
    let mut failures_in_a_row = 0;

    loop {
        player.process_signals();

        if player.needs_user_gesture() {
            // The refusal stands until the user interacts with the page
            debug!("Simulating tap to play");
            gestures += 1;
            browser.set_play_policy(PlayPolicy::Allow);
            player.play()?;
            player.process_signals();
            if !config.session.autoplay_allowed {
                browser.set_play_policy(PlayPolicy::Deny);
            }
        }

        if options.like_all && player.is_playing() {
            if let Some(track) = player.current_track() {
                if !liked.contains(&track.id) {
                    liked.push(track.id.clone());
                    player.like()?;
                }
            }
        }

        let mut failed = false;
        for event in player.drain_events() {
            match &event {
                PlaybackEvent::TrackFinished { track_id } => {
                    finished.push(track_id.clone());
                    failures_in_a_row = 0;
                }
                PlaybackEvent::Error {
                    track_id: Some(track_id),
                    ..
                } => {
                    skipped.push(track_id.clone());
                    failures_in_a_row += 1;
                    failed = true;
                }
                _ => {}
            }
            events.push(event);
        }

        if failed {
            // Skip what cannot be loaded, the way the player view does,
            // and give up once every queued track has failed
            if failures_in_a_row >= tracks.len() || !player.next()? {
                player.close();
            }
            ticks += 1;
            if ticks >= config.session.max_ticks {
                break;
            }
            continue;
        }

        if player.state() == PlayerState::Idle || ticks >= config.session.max_ticks {
            break;
        }

        browser.tick(config.session.tick_seconds);
        ticks += 1;
    }

    let completed = player.state() == PlayerState::Idle;
    info!(ticks, finished = finished.len(), completed, "Play session finished");

    Ok(PlayReport {
        events,
        finished,
        ticks,
        gestures,
        skipped,
        engagement: engagement(&tracks, &counters),
        completed,
    })
}

fn engagement(tracks: &[Track], counters: &EngagementCounters) -> Vec<(TrackId, Engagement)> {
    tracks
        .iter()
        .map(|t| (t.id.clone(), counters.get(&t.id)))
        .collect()
}
