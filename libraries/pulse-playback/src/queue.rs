//! Playback queue
//!
//! Ordered tracks plus a cursor. The cursor is `None` before the first track
//! has been selected; navigation never moves it past either end unless the
//! caller asks for wrapping.

use pulse_core::{Track, TrackId};

/// Ordered queue with a cursor
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    index: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue, placing the cursor on `start`
    ///
    /// Returns `false` (leaving the cursor unset) when `start` is out of range.
    pub fn set(&mut self, tracks: Vec<Track>, start: Option<usize>) -> bool {
        self.tracks = tracks;
        self.index = None;
        match start {
            Some(i) if i < self.tracks.len() => {
                self.index = Some(i);
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    /// Append a track
    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Remove track at index
    ///
    /// Removing the current track moves the cursor back one slot so the
    /// following track is next in line.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }

        let removed = self.tracks.remove(index);
        self.index = match self.index {
            Some(current) if index <= current => current.checked_sub(1),
            other => other,
        };
        Some(removed)
    }

    /// Clear all tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index = None;
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    /// Cursor position
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Find a track by id
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Point the cursor at `index`
    pub fn jump(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }
        self.index = Some(index);
        self.tracks.get(index)
    }

    /// Index `advance` would move to, without moving
    pub fn peek_next_index(&self, wrap: bool) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        match self.index {
            None => Some(0),
            Some(i) if i + 1 < self.tracks.len() => Some(i + 1),
            Some(_) if wrap => Some(0),
            Some(_) => None,
        }
    }

    /// Index `retreat` would move to, without moving
    pub fn peek_previous_index(&self, wrap: bool) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        match self.index {
            Some(i) if i > 0 => Some(i - 1),
            _ if wrap => Some(self.tracks.len() - 1),
            _ => None,
        }
    }

    /// Move the cursor forward
    pub fn advance(&mut self, wrap: bool) -> Option<&Track> {
        let next = self.peek_next_index(wrap)?;
        self.jump(next)
    }

    /// Move the cursor back
    pub fn retreat(&mut self, wrap: bool) -> Option<&Track> {
        let previous = self.peek_previous_index(wrap)?;
        self.jump(previous)
    }
}
