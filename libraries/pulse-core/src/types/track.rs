/// Track domain type
use crate::error::{PulseError, Result};
use crate::types::{TrackId, UserId};
use serde::{Deserialize, Serialize};

/// What kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Song from the music catalog
    #[default]
    Music,
    /// Podcast episode
    Podcast,
    /// Short-form or feed video
    Video,
}

impl MediaKind {
    /// Whether the track renders into a video surface
    pub fn is_video(self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

/// A playable media item
///
/// Carries the source url plus the display metadata the mini-player,
/// full-screen player and reel feed render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier; catalog entries without one get a random id
    #[serde(default = "TrackId::generate")]
    pub id: TrackId,

    /// Media source location
    pub url: String,

    /// Track title
    pub title: String,

    /// Artist (music) or host (podcast) name as published
    #[serde(default)]
    pub artist: Option<String>,

    /// Cover image location
    #[serde(default)]
    pub cover_url: Option<String>,

    /// Media kind
    #[serde(default)]
    pub kind: MediaKind,

    /// Verified badge shown next to the artist
    #[serde(default)]
    pub verified: bool,

    /// Uploader to resolve through an `ArtistDirectory`
    #[serde(default)]
    pub uploader_id: Option<UserId>,

    /// Duration in seconds as known by the catalog, before the element
    /// reports real metadata
    #[serde(default)]
    pub duration_hint: Option<f64>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(id: impl Into<TrackId>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            artist: None,
            cover_url: None,
            kind: MediaKind::Music,
            verified: false,
            uploader_id: None,
            duration_hint: None,
        }
    }

    /// Set the published artist/host name
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the cover image
    #[must_use]
    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    /// Set the media kind
    #[must_use]
    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark as verified
    #[must_use]
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Set the uploader
    #[must_use]
    pub fn with_uploader(mut self, uploader: impl Into<UserId>) -> Self {
        self.uploader_id = Some(uploader.into());
        self
    }

    /// Set the catalog duration in seconds
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_hint = Some(seconds);
        self
    }

    /// Check that the track can be attached to a media element
    ///
    /// # Errors
    /// Returns `PulseError::InvalidTrack` for a blank url or a negative or
    /// non-finite duration hint.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(PulseError::invalid_track(&self.id, "empty url"));
        }

        if let Some(duration) = self.duration_hint {
            if !duration.is_finite() || duration < 0.0 {
                return Err(PulseError::invalid_track(
                    &self.id,
                    format!("bad duration hint {duration}"),
                ));
            }
        }

        Ok(())
    }
}
