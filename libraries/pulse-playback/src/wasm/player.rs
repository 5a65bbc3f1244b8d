//! WASM-compatible media player wrapper

use pulse_core::Track;
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

use super::element::WebMediaElement;
use crate::{MediaController, PlaybackError, PlayerConfig, RepeatMode};

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// JavaScript-facing media player
///
/// Wraps a [`MediaController`] over one `HTMLMediaElement`. The page calls
/// `pump()` from its frame loop to apply queued media events, then reads
/// `status()` and `drainEvents()` to render.
#[wasm_bindgen]
pub struct WasmMediaPlayer {
    inner: MediaController<WebMediaElement>,
}

#[wasm_bindgen]
impl WasmMediaPlayer {
    /// Take ownership of an `<audio>`/`<video>` element
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlMediaElement) -> Self {
        console_error_panic_hook::set_once();

        Self {
            inner: MediaController::new(WebMediaElement::new(element), PlayerConfig::default()),
        }
    }

    /// Load a track (`{ id, url, title, ... }`)
    pub fn load(&mut self, track: JsValue) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {e}")))?;
        self.inner.load(track).map_err(to_js)
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<(), JsValue> {
        self.inner.play().map_err(to_js)
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.inner.pause();
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) -> Result<(), JsValue> {
        self.inner.toggle().map_err(to_js)
    }

    /// Pause and rewind
    pub fn stop(&mut self) {
        self.inner.stop();
    }

    /// Seek to seconds
    pub fn seek(&mut self, seconds: f64) -> Result<(), JsValue> {
        self.inner.seek(seconds).map_err(to_js)
    }

    /// Next queue item; `false` at the end of the queue
    pub fn next(&mut self) -> Result<bool, JsValue> {
        self.inner.next().map_err(to_js)
    }

    /// Previous queue item; `false` at the start of the queue
    pub fn previous(&mut self) -> Result<bool, JsValue> {
        self.inner.previous().map_err(to_js)
    }

    /// Replace the queue and play item `start`
    #[wasm_bindgen(js_name = playQueue)]
    pub fn play_queue(&mut self, tracks: JsValue, start: usize) -> Result<(), JsValue> {
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {e}")))?;
        self.inner.play_queue(tracks, start).map_err(to_js)
    }

    /// Jump to queue item
    #[wasm_bindgen(js_name = skipTo)]
    pub fn skip_to(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.skip_to(index).map_err(to_js)
    }

    /// Set repeat mode ('off', 'all', 'one')
    #[wasm_bindgen(js_name = setRepeat)]
    pub fn set_repeat(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "off" => RepeatMode::Off,
            "all" => RepeatMode::All,
            "one" => RepeatMode::One,
            _ => return Err(JsValue::from_str("Invalid repeat mode. Use 'off', 'all', or 'one'")),
        };
        self.inner.set_repeat(mode);
        Ok(())
    }

    /// Set volume (0-100)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: u8) {
        self.inner.set_volume(level);
    }

    /// Toggle mute
    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
    }

    /// Tear down the source and empty the player
    pub fn close(&mut self) {
        self.inner.close();
    }

    /// Apply queued media events; returns how many were received
    pub fn pump(&mut self) -> usize {
        self.inner.process_signals()
    }

    /// Current status snapshot
    pub fn status(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.status()).unwrap_or(JsValue::NULL)
    }

    /// Events since the last call
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.drain_events()).unwrap_or(JsValue::NULL)
    }
}
