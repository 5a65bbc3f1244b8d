mod artist;
mod ids;
mod track;

pub use artist::ArtistProfile;
pub use ids::{TrackId, UserId};
pub use track::{MediaKind, Track};
