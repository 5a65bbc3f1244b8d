//! Pulse Core
//!
//! Platform-agnostic media types, lookup traits, and error handling shared by
//! every Pulse surface (feed, music player, reels, profile).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `MediaKind`, `ArtistProfile`
//! - **Core Traits**: `ArtistDirectory` (uploader lookup)
//! - **Error Handling**: Unified `PulseError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use pulse_core::types::{MediaKind, Track};
//! use pulse_core::{display_artist, NoDirectory};
//!
//! let track = Track::new("t1", "https://cdn.example.com/t1.mp3", "Night Drive")
//!     .with_kind(MediaKind::Music)
//!     .with_uploader("user-42");
//!
//! // Unknown uploaders fall back to a placeholder instead of failing
//! assert_eq!(display_artist(&track, &NoDirectory), "Artist");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PulseError, Result};
pub use traits::{display_artist, ArtistDirectory, NoDirectory, UNKNOWN_ARTIST};
pub use types::{ArtistProfile, MediaKind, Track, TrackId, UserId};
