/// Core traits for Pulse
use crate::types::{ArtistProfile, Track, UserId};
use std::collections::HashMap;

/// Placeholder shown when an uploader cannot be resolved
pub const UNKNOWN_ARTIST: &str = "Artist";

/// Read-only uploader lookup
///
/// Implemented by whatever owns user profiles (feed cache, profile service).
/// A missing entry is a normal outcome, not an error.
pub trait ArtistDirectory {
    /// Resolve an uploader to a displayable profile
    fn lookup(&self, uploader_id: &UserId) -> Option<ArtistProfile>;
}

impl ArtistDirectory for HashMap<UserId, ArtistProfile> {
    fn lookup(&self, uploader_id: &UserId) -> Option<ArtistProfile> {
        self.get(uploader_id).cloned()
    }
}

/// Directory that knows nobody
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDirectory;

impl ArtistDirectory for NoDirectory {
    fn lookup(&self, _uploader_id: &UserId) -> Option<ArtistProfile> {
        None
    }
}

/// Name to render under a track
///
/// Resolution order: uploader profile, then the published artist string,
/// then [`UNKNOWN_ARTIST`].
pub fn display_artist<D: ArtistDirectory + ?Sized>(track: &Track, directory: &D) -> String {
    track
        .uploader_id
        .as_ref()
        .and_then(|id| directory.lookup(id))
        .map(|profile| profile.display_name)
        .filter(|name| !name.trim().is_empty())
        .or_else(|| track.artist.clone().filter(|a| !a.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> HashMap<UserId, ArtistProfile> {
        let mut map = HashMap::new();
        map.insert(
            UserId::new("u1"),
            ArtistProfile {
                id: UserId::new("u1"),
                display_name: "Nova".to_string(),
                avatar_url: None,
                verified: true,
            },
        );
        map
    }

    #[test]
    fn resolves_known_uploader() {
        let track = Track::new("t1", "https://cdn/t1.mp3", "Song").with_uploader("u1");
        assert_eq!(display_artist(&track, &directory()), "Nova");
    }

    #[test]
    fn unknown_uploader_falls_back_to_published_artist() {
        let track = Track::new("t1", "https://cdn/t1.mp3", "Song")
            .with_uploader("ghost")
            .with_artist("Published Name");
        assert_eq!(display_artist(&track, &directory()), "Published Name");
    }

    #[test]
    fn unknown_everything_renders_placeholder() {
        let track = Track::new("t1", "https://cdn/t1.mp3", "Song").with_uploader("ghost");
        assert_eq!(display_artist(&track, &directory()), UNKNOWN_ARTIST);
        assert_eq!(display_artist(&track, &NoDirectory), UNKNOWN_ARTIST);
    }
}
