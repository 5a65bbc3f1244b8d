//! Perceptual volume for media elements
//!
//! The UI slider works in percent; `HTMLMediaElement.volume` is a linear
//! amplitude in `[0, 1]`. Percent maps onto a 60 dB range so that equal
//! slider steps sound like equal loudness steps.

/// Loudness at 1% on the slider
const FLOOR_DB: f64 = -60.0;

/// Slider position and mute flag for one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: u8,
    muted: bool,
}

impl Volume {
    /// Volume at `level` percent (clamped to 100), unmuted
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
            muted: false,
        }
    }

    /// Move the slider; the mute flag is kept
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    /// Slider position (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Linear volume for the element, `0.0` when muted or at 0%
    pub fn gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            level_to_gain(self.level)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(80)
    }
}

/// 100% is 0 dB, every percent below it is 0.6 dB quieter; 0% is silent
fn level_to_gain(level: u8) -> f64 {
    match level {
        0 => 0.0,
        100.. => 1.0,
        _ => {
            let db = FLOOR_DB * (1.0 - f64::from(level) / 100.0);
            10.0_f64.powf(db / 20.0)
        }
    }
}
