//! WASM bindings for pulse-playback
//!
//! Binds the controller to a browser `HTMLMediaElement` so the same
//! transport logic runs in the web client.

#[cfg(feature = "wasm")]
pub mod element;

#[cfg(feature = "wasm")]
pub mod player;

#[cfg(feature = "wasm")]
pub use element::WebMediaElement;

#[cfg(feature = "wasm")]
pub use player::WasmMediaPlayer;
