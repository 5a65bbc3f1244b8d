//! Property-based tests for the controller and the autoplay coordinator
//!
//! Uses proptest to check invariants across random operation sequences.

use proptest::prelude::*;
use pulse_core::{MediaKind, Track, TrackId};
use pulse_playback::{
    AutoplayCoordinator, MediaController, OverlayKind, PlayerConfig, PlayerState, RepeatMode,
    SimulatedElement,
};

// ===== Helpers =====

fn track(n: usize) -> Track {
    Track::new(
        format!("t{n}"),
        format!("https://cdn.pulse.test/audio/t{n}.mp3"),
        format!("Track {n}"),
    )
}

fn reel_id(n: usize) -> TrackId {
    TrackId::new(format!("r{n}"))
}

#[derive(Debug, Clone)]
enum FeedOp {
    Visibility(usize, f64),
    Tap(usize),
    OpenOverlay(bool),
    CloseOverlay(bool),
    Unregister(usize),
    Pump,
}

fn feed_op(reels: usize) -> impl Strategy<Value = FeedOp> {
    prop_oneof![
        4 => (0..reels, 0.0f64..=1.0).prop_map(|(i, r)| FeedOp::Visibility(i, r)),
        1 => (0..reels).prop_map(FeedOp::Tap),
        1 => any::<bool>().prop_map(FeedOp::OpenOverlay),
        1 => any::<bool>().prop_map(FeedOp::CloseOverlay),
        1 => (0..reels).prop_map(FeedOp::Unregister),
        2 => Just(FeedOp::Pump),
    ]
}

#[derive(Debug, Clone)]
enum QueueOp {
    Next,
    Previous,
    SkipTo(usize),
    Enqueue,
    Remove(usize),
    End,
    Repeat(u8),
}

fn queue_op() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        (Just(QueueOp::Next)),
        (Just(QueueOp::Previous)),
        (0usize..12).prop_map(QueueOp::SkipTo),
        (Just(QueueOp::Enqueue)),
        (0usize..12).prop_map(QueueOp::Remove),
        (Just(QueueOp::End)),
        (0u8..3).prop_map(QueueOp::Repeat),
    ]
}

fn overlay(comments: bool) -> OverlayKind {
    if comments {
        OverlayKind::Comments
    } else {
        OverlayKind::Share
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: at most one reel wants playback, whatever the scroll,
    /// overlay and tap sequence
    #[test]
    fn at_most_one_reel_plays(
        ops in prop::collection::vec(feed_op(5), 1..120)
    ) {
        let mut coordinator = AutoplayCoordinator::default();
        let mut handles = Vec::new();
        for n in 0..5 {
            let (element, handle) = SimulatedElement::auto();
            let reel = Track::new(
                reel_id(n),
                format!("https://cdn.pulse.test/reels/r{n}.mp4"),
                format!("Reel {n}"),
            )
            .with_kind(MediaKind::Video);
            coordinator.register(&reel, element).unwrap();
            handles.push(handle);
        }

        for op in ops {
            match op {
                FeedOp::Visibility(i, ratio) => coordinator.on_visibility_change(&reel_id(i), ratio),
                FeedOp::Tap(i) => coordinator.tap(&reel_id(i)),
                FeedOp::OpenOverlay(c) => coordinator.open_overlay(overlay(c)),
                FeedOp::CloseOverlay(c) => coordinator.close_overlay(overlay(c)),
                FeedOp::Unregister(i) => {
                    coordinator.unregister(&reel_id(i));
                }
                FeedOp::Pump => {
                    for (n, handle) in handles.iter().enumerate() {
                        for signal in handle.take_signals() {
                            coordinator.handle_signal(&reel_id(n), signal);
                        }
                    }
                }
            }

            prop_assert!(coordinator.playing_count() <= 1);
            let audible = handles.iter().filter(|h| h.is_playing()).count();
            prop_assert!(audible <= 1, "{} elements producing output", audible);
            if coordinator.overlay_open() {
                prop_assert_eq!(audible, 0);
            }
        }
    }

    /// Property: seek always lands inside [0, duration]
    #[test]
    fn seek_stays_within_duration(
        duration in 1.0f64..7200.0,
        targets in prop::collection::vec(-1.0e6f64..1.0e6, 1..40)
    ) {
        let (element, browser) = SimulatedElement::manual();
        let mut player = MediaController::new(element, PlayerConfig::default());
        browser.set_duration("https://cdn.pulse.test/audio/t0.mp3", duration);
        player.load(track(0)).unwrap();
        browser.load();
        player.process_signals();

        for target in targets {
            player.seek(target).unwrap();
            prop_assert!(player.position() >= 0.0);
            prop_assert!(player.position() <= duration);
            prop_assert_eq!(player.position(), browser.current_time());
        }
    }

    /// Property: the queue cursor never points past the queue, and the
    /// attached source always belongs to the current track
    #[test]
    fn queue_cursor_stays_in_bounds(
        initial in 1usize..8,
        start_seed in any::<prop::sample::Index>(),
        ops in prop::collection::vec(queue_op(), 1..60)
    ) {
        let (element, browser) = SimulatedElement::auto();
        let mut player = MediaController::new(element, PlayerConfig::default());
        let start = start_seed.index(initial);
        player.play_queue((0..initial).map(track).collect(), start).unwrap();
        player.process_signals();
        let mut added = initial;

        for op in ops {
            match op {
                QueueOp::Next => { player.next().unwrap(); }
                QueueOp::Previous => { player.previous().unwrap(); }
                QueueOp::SkipTo(i) => {
                    let result = player.skip_to(i);
                    prop_assert_eq!(result.is_ok(), i < player.queue().len());
                }
                QueueOp::Enqueue => {
                    player.enqueue(track(added)).unwrap();
                    added += 1;
                }
                QueueOp::Remove(i) => {
                    let len = player.queue().len();
                    prop_assert_eq!(player.remove_from_queue(i).is_ok(), i < len);
                }
                QueueOp::End => { browser.end(); }
                QueueOp::Repeat(mode) => player.set_repeat(match mode {
                    0 => RepeatMode::Off,
                    1 => RepeatMode::All,
                    _ => RepeatMode::One,
                }),
            }
            player.process_signals();

            if let Some(index) = player.queue_index() {
                prop_assert!(index < player.queue().len());
            }
            match player.current_track() {
                Some(current) => prop_assert_eq!(player.attached_url(), Some(current.url.as_str())),
                None => {
                    prop_assert!(player.attached_url().is_none());
                    prop_assert_eq!(player.state(), PlayerState::Idle);
                }
            }
        }
    }

    /// Property: a play result never counts unless its request is still
    /// the pending one for the attached source
    #[test]
    fn stale_resolutions_never_mark_playing(switches in 1usize..6) {
        let (element, browser) = SimulatedElement::manual();
        let mut player = MediaController::new(element, PlayerConfig::default());

        for n in 0..switches {
            player.load(track(n)).unwrap();
            player.play().unwrap();
        }
        // Settle every earlier request first, then the live one
        for _ in 1..switches {
            browser.resolve_play();
            player.process_signals();
            prop_assert!(!player.is_playing());
        }
        browser.resolve_play();
        player.process_signals();
        prop_assert!(player.is_playing());
        prop_assert_eq!(
            player.current_track().map(|t| t.id.clone()),
            Some(track(switches - 1).id)
        );
    }
}
