/// Simulator configuration
use crate::error::{Result, SimError};
use pulse_core::{MediaKind, Track};
use pulse_playback::{AutoplayConfig, PlayerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "pulse-sim.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub autoplay: AutoplayConfig,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_reels")]
    pub reels: ReelSettings,

    /// Catalog to play; the built-in demo catalog when empty
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Simulated seconds per tick
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,

    /// Hard stop for sessions that never finish (repeat modes)
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,

    /// Whether the simulated browser lets playback start without a gesture
    #[serde(default = "default_autoplay_allowed")]
    pub autoplay_allowed: bool,

    /// Urls the simulated browser fails to load
    #[serde(default)]
    pub broken_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReelSettings {
    /// Feed scroll offset per step, in reel heights
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,

    /// Simulated seconds of playback between scroll steps
    #[serde(default = "default_dwell_seconds")]
    pub dwell_seconds: f64,
}

impl SimConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `pulse-sim.toml` is read if
    /// present. `PULSE_*` variables override file values, with `__` between
    /// nesting levels (`PULSE_PLAYER__VOLUME=40`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`load`](Self::load), reading overrides from `vars` instead
    /// of the process environment when given
    pub fn load_with_env(path: Option<&Path>, vars: Option<config::Map<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SimError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with PULSE_)
        settings = settings.add_source(
            config::Environment::with_prefix("PULSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(vars),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.player.volume > 100 {
            return Err(SimError::Config(format!(
                "player.volume must be 0-100, got {}",
                self.player.volume
            )));
        }

        if let Some(threshold) = self.player.previous_restart_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(SimError::Config(format!(
                    "player.previous_restart_threshold must be a non-negative number, got {threshold}"
                )));
            }
        }

        let ratio = self.autoplay.visibility_threshold;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(SimError::Config(format!(
                "autoplay.visibility_threshold must be in (0, 1], got {ratio}"
            )));
        }

        if !(self.session.tick_seconds.is_finite() && self.session.tick_seconds > 0.0) {
            return Err(SimError::Config(
                "session.tick_seconds must be positive".to_string(),
            ));
        }

        if self.session.max_ticks == 0 {
            return Err(SimError::Config(
                "session.max_ticks must be at least 1".to_string(),
            ));
        }

        if !(self.reels.scroll_step.is_finite() && self.reels.scroll_step > 0.0) {
            return Err(SimError::Config(
                "reels.scroll_step must be positive".to_string(),
            ));
        }

        if !(self.reels.dwell_seconds.is_finite() && self.reels.dwell_seconds >= 0.0) {
            return Err(SimError::Config(
                "reels.dwell_seconds must be non-negative".to_string(),
            ));
        }

        for track in &self.tracks {
            track.validate()?;
        }

        Ok(())
    }

    /// Audio catalog: configured non-video tracks, or the demo catalog
    pub fn audio_catalog(&self) -> Vec<Track> {
        let configured: Vec<Track> = self
            .tracks
            .iter()
            .filter(|t| !t.kind.is_video())
            .cloned()
            .collect();
        if configured.is_empty() {
            demo_audio()
        } else {
            configured
        }
    }

    /// Reel feed: configured videos, or the demo feed
    pub fn reel_feed(&self) -> Vec<Track> {
        let configured: Vec<Track> = self
            .tracks
            .iter()
            .filter(|t| t.kind.is_video())
            .cloned()
            .collect();
        if configured.is_empty() {
            demo_reels()
        } else {
            configured
        }
    }
}

fn demo_audio() -> Vec<Track> {
    vec![
        Track::new("song-1", "https://cdn.pulse.test/audio/song-1.mp3", "Morning Run")
            .with_artist("Lagos Lights")
            .with_duration(12.0),
        Track::new("pod-1", "https://cdn.pulse.test/audio/pod-1.mp3", "Founders Hour #12")
            .with_kind(MediaKind::Podcast)
            .with_duration(20.0),
        Track::new("song-2", "https://cdn.pulse.test/audio/song-2.mp3", "Late Bus")
            .with_artist("Kiki Ade")
            .verified()
            .with_duration(9.0),
    ]
}

fn demo_reels() -> Vec<Track> {
    (1..=4)
        .map(|n| {
            Track::new(
                format!("reel-{n}"),
                format!("https://cdn.pulse.test/reels/reel-{n}.mp4"),
                format!("Reel {n}"),
            )
            .with_kind(MediaKind::Video)
            .with_duration(6.0)
        })
        .collect()
}

// Default values
fn default_session() -> SessionSettings {
    SessionSettings {
        tick_seconds: default_tick_seconds(),
        max_ticks: default_max_ticks(),
        autoplay_allowed: default_autoplay_allowed(),
        broken_urls: Vec::new(),
    }
}

fn default_tick_seconds() -> f64 {
    1.0
}

fn default_max_ticks() -> usize {
    10_000
}

fn default_autoplay_allowed() -> bool {
    true
}

fn default_reels() -> ReelSettings {
    ReelSettings {
        scroll_step: default_scroll_step(),
        dwell_seconds: default_dwell_seconds(),
    }
}

fn default_scroll_step() -> f64 {
    0.25
}

fn default_dwell_seconds() -> f64 {
    2.0
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            autoplay: AutoplayConfig::default(),
            session: default_session(),
            reels: default_reels(),
            tracks: Vec::new(),
        }
    }
}
