/// Simulator error types
use pulse_core::PulseError;
use pulse_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Invalid catalog entry: {0}")]
    Catalog(#[from] PulseError),

    #[error("Session error: {0}")]
    Session(String),
}

impl From<config::ConfigError> for SimError {
    fn from(err: config::ConfigError) -> Self {
        SimError::Config(err.to_string())
    }
}
