//! Artist types

use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Displayable profile of an uploader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistProfile {
    /// Uploader this profile belongs to
    pub id: UserId,

    /// Name shown under the track title
    pub display_name: String,

    /// Profile picture location
    #[serde(default)]
    pub avatar_url: Option<String>,

    /// Verified badge
    #[serde(default)]
    pub verified: bool,
}
