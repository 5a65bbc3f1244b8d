//! Native media signals
//!
//! Everything the underlying element reports back (metadata loaded, progress,
//! end of media, errors, play-request outcomes) arrives as a [`MediaSignal`].
//! Each signal is tagged with the [`SourceId`] it belongs to, so the
//! controller can drop signals for a source that has since been replaced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::Sender;

/// Generation number of an attached source
///
/// A fresh id is allocated every time a different url is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src#{}", self.0)
    }
}

/// Identifier of a single play request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// An outstanding asynchronous play request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayRequest {
    pub id: RequestId,
    pub source: SourceId,
}

/// Why the element refused a play request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayRejection {
    /// Autoplay policy: playback needs a user gesture
    NotAllowed,

    /// Interrupted by a pause or a source change
    Aborted,

    /// No playable source
    NotSupported,

    /// Anything else the platform reports
    Other(String),
}

impl PlayRejection {
    /// Map a DOM exception name (`NotAllowedError`, `AbortError`, ...)
    pub fn from_dom_name(name: &str) -> Self {
        match name {
            "NotAllowedError" => Self::NotAllowed,
            "AbortError" => Self::Aborted,
            "NotSupportedError" => Self::NotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    /// Expected rejections are part of normal operation and are not logged
    /// as warnings
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotAllowed | Self::Aborted)
    }
}

impl fmt::Display for PlayRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "autoplay not allowed"),
            Self::Aborted => write!(f, "aborted"),
            Self::NotSupported => write!(f, "no supported source"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Source loading failure reported by the element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaErrorKind {
    /// Fetch aborted by the user agent
    Aborted,

    /// Network failure while fetching media
    Network,

    /// Media could not be decoded
    Decode,

    /// Url unreachable or format unsupported
    SourceNotSupported,

    /// Unrecognized error
    Unknown(String),
}

impl MediaErrorKind {
    /// Map an HTML `MediaError.code`
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Aborted,
            2 => Self::Network,
            3 => Self::Decode,
            4 => Self::SourceNotSupported,
            other => Self::Unknown(format!("code {other}")),
        }
    }
}

impl fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted => write!(f, "fetch aborted"),
            Self::Network => write!(f, "network error"),
            Self::Decode => write!(f, "decode error"),
            Self::SourceNotSupported => write!(f, "source not supported"),
            Self::Unknown(detail) => write!(f, "unknown media error ({detail})"),
        }
    }
}

/// Signal reported by a media element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaSignal {
    /// First frame available (`loadeddata`)
    LoadedData { source: SourceId, duration: f64 },

    /// Duration became known or changed (`durationchange`)
    DurationChange { source: SourceId, duration: f64 },

    /// Periodic progress (`timeupdate`)
    TimeUpdate { source: SourceId, current_time: f64 },

    /// A seek finished (`seeked`)
    Seeked { source: SourceId, current_time: f64 },

    /// Playback reached the end (`ended`)
    Ended { source: SourceId },

    /// Source failed to load (`error`)
    Error { source: SourceId, kind: MediaErrorKind },

    /// The play promise resolved
    PlayResolved { request: PlayRequest },

    /// The play promise rejected
    PlayRejected {
        request: PlayRequest,
        rejection: PlayRejection,
    },
}

impl MediaSignal {
    /// Source this signal refers to
    pub fn source(&self) -> SourceId {
        match self {
            Self::LoadedData { source, .. }
            | Self::DurationChange { source, .. }
            | Self::TimeUpdate { source, .. }
            | Self::Seeked { source, .. }
            | Self::Ended { source }
            | Self::Error { source, .. } => *source,
            Self::PlayResolved { request } | Self::PlayRejected { request, .. } => request.source,
        }
    }
}

/// Channel end handed to an element when a controller subscribes to it
///
/// Sending never fails loudly: once the controller is dropped the signal is
/// discarded.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: Sender<MediaSignal>,
}

impl SignalSender {
    pub(crate) fn new(tx: Sender<MediaSignal>) -> Self {
        Self { tx }
    }

    /// Deliver a signal; returns `false` when the subscriber is gone
    pub fn send(&self, signal: MediaSignal) -> bool {
        self.tx.send(signal).is_ok()
    }
}
