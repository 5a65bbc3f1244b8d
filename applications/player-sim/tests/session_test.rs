//! End-to-end tests for the simulator sessions
//!
//! Load configuration the way the binary does, then run scripted play and
//! reel-scroll sessions and check the event streams they produce.

use proptest::prelude::*;
use pulse_playback::{AutoplayEvent, PlaybackEvent, PlayerState, RepeatMode};
use pulse_player_sim::{run_play, run_reels, PlayOptions, ReelOptions, SimConfig, SimError};
use std::io::Write;
use tempfile::NamedTempFile;

// ===== Test Helpers =====

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn load(contents: &str) -> SimConfig {
    let file = config_file(contents);
    SimConfig::load_with_env(Some(file.path()), Some(config::Map::new())).unwrap()
}

const CATALOG: &str = r#"
[player]
volume = 60

[session]
tick_seconds = 0.5

[[tracks]]
id = "intro"
url = "https://cdn.pulse.test/audio/intro.mp3"
title = "Intro"
duration_hint = 3.0

[[tracks]]
id = "episode"
url = "https://cdn.pulse.test/audio/episode.mp3"
title = "Episode 1"
kind = "podcast"
duration_hint = 4.0

[[tracks]]
id = "clip"
url = "https://cdn.pulse.test/reels/clip.mp4"
title = "Clip"
kind = "video"
duration_hint = 5.0
"#;

// ===== Configuration =====

#[test]
fn file_configuration_is_loaded() {
    let config = load(CATALOG);

    assert_eq!(config.player.volume, 60);
    assert_eq!(config.session.tick_seconds, 0.5);
    assert_eq!(config.tracks.len(), 3);
    assert_eq!(config.audio_catalog().len(), 2);
    assert_eq!(config.reel_feed().len(), 1);
}

#[test]
fn invalid_file_values_fail_validation() {
    let file = config_file("[autoplay]\nvisibility_threshold = 1.5\n");
    let result = SimConfig::load_with_env(Some(file.path()), Some(config::Map::new()));
    assert!(matches!(result, Err(SimError::Config(_))));
}

#[test]
fn environment_beats_file() {
    let file = config_file(CATALOG);
    let mut vars = config::Map::new();
    vars.insert("PULSE_PLAYER__VOLUME".to_string(), "25".to_string());

    let config = SimConfig::load_with_env(Some(file.path()), Some(vars)).unwrap();
    assert_eq!(config.player.volume, 25);
    assert_eq!(config.session.tick_seconds, 0.5);
}

// ===== Play Sessions =====

#[test]
fn configured_queue_plays_in_order() {
    let config = load(CATALOG);
    let report = run_play(&config, &PlayOptions::default()).unwrap();

    let finished: Vec<&str> = report.finished.iter().map(|id| id.as_str()).collect();
    assert_eq!(finished, vec!["intro", "episode"]);
    assert!(report.completed);
    assert!(report.skipped.is_empty());
    assert!(matches!(
        report.events.last(),
        Some(PlaybackEvent::StateChanged {
            state: PlayerState::Idle
        })
    ));
}

#[test]
fn starting_mid_queue_skips_earlier_tracks() {
    let config = load(CATALOG);
    let options = PlayOptions {
        start: 1,
        ..PlayOptions::default()
    };
    let report = run_play(&config, &options).unwrap();

    assert_eq!(report.finished.len(), 1);
    assert_eq!(report.finished[0].as_str(), "episode");
    assert_eq!(report.engagement[0].1.plays, 0);
}

#[test]
fn blocked_autoplay_needs_one_tap_per_track() {
    let mut config = SimConfig::default();
    config.session.autoplay_allowed = false;

    let report = run_play(&config, &PlayOptions::default()).unwrap();

    assert!(report.completed);
    assert_eq!(report.gestures, 3);
    let blocked = report
        .events
        .iter()
        .filter(|e| matches!(e, PlaybackEvent::PlaybackBlocked { .. }))
        .count();
    assert_eq!(blocked, 3);
}

#[test]
fn repeat_all_runs_until_tick_limit() {
    let mut config = SimConfig::default();
    config.session.max_ticks = 200;
    let options = PlayOptions {
        repeat: Some(RepeatMode::All),
        ..PlayOptions::default()
    };

    let report = run_play(&config, &options).unwrap();

    assert!(!report.completed);
    assert_eq!(report.ticks, 200);
    assert!(report.finished.len() > 3);
}

#[test]
fn broken_sources_are_skipped() {
    let contents = r#"
[session]
broken_urls = ["https://cdn.pulse.test/audio/episode.mp3"]

[[tracks]]
id = "intro"
url = "https://cdn.pulse.test/audio/intro.mp3"
title = "Intro"
duration_hint = 2.0

[[tracks]]
id = "episode"
url = "https://cdn.pulse.test/audio/episode.mp3"
title = "Episode 1"
duration_hint = 4.0

[[tracks]]
id = "outro"
url = "https://cdn.pulse.test/audio/outro.mp3"
title = "Outro"
duration_hint = 2.0
"#;
    let config = load(contents);
    let report = run_play(&config, &PlayOptions::default()).unwrap();

    let skipped: Vec<&str> = report.skipped.iter().map(|id| id.as_str()).collect();
    let finished: Vec<&str> = report.finished.iter().map(|id| id.as_str()).collect();
    assert_eq!(skipped, vec!["episode"]);
    assert_eq!(finished, vec!["intro", "outro"]);
    assert!(report.completed);
}

#[test]
fn likes_reach_listeners_once_per_track() {
    let config = SimConfig::default();
    let options = PlayOptions {
        like_all: true,
        ..PlayOptions::default()
    };
    let report = run_play(&config, &options).unwrap();
    assert!(report.completed);
    assert!(report
        .engagement
        .iter()
        .all(|(_, e)| e.plays == 1 && e.likes == 1 && e.downloads == 0));
}

// ===== Reel Sessions =====

#[test]
fn comments_pause_active_reel_then_resume() {
    let options = ReelOptions {
        comments_at: Some(1),
        ..ReelOptions::default()
    };
    let report = run_reels(&SimConfig::default(), &options).unwrap();

    let reel_2 = pulse_core::TrackId::new("reel-2");
    let position = |wanted: &AutoplayEvent| report.events.iter().position(|e| e == wanted);
    let requested = AutoplayEvent::PlayRequested { id: reel_2.clone() };
    let paused = AutoplayEvent::Paused { id: reel_2.clone() };

    let first_play = position(&requested).unwrap();
    let pause = position(&paused).unwrap();
    assert!(first_play < pause);
    assert!(report.events[pause + 1..].contains(&requested));
    assert_eq!(report.max_playing, 1);
}

#[test]
fn blocked_reels_need_taps() {
    let mut config = SimConfig::default();
    config.session.autoplay_allowed = false;

    let report = run_reels(&config, &ReelOptions::default()).unwrap();

    assert_eq!(report.gestures, 4);
    assert_eq!(report.activations.len(), 4);
    assert!(report.max_playing <= 1);
}

#[test]
fn narrow_window_recycles_reels() {
    let options = ReelOptions {
        window: 1,
        ..ReelOptions::default()
    };
    let report = run_reels(&SimConfig::default(), &options).unwrap();
    assert_eq!(report.activations.len(), 4);
    assert_eq!(
        report.final_active.as_ref().map(|id| id.as_str()),
        Some("reel-4")
    );
}

proptest! {
    /// Property: whatever the scroll step, at most one reel plays
    #[test]
    fn any_scroll_step_keeps_one_reel(step in 0.05f64..1.5, window in 1usize..4) {
        let options = ReelOptions {
            step: Some(step),
            window,
            ..ReelOptions::default()
        };
        let report = run_reels(&SimConfig::default(), &options).unwrap();
        prop_assert!(report.max_playing <= 1);
        prop_assert!(report.activations.len() <= report.steps);
    }
}
