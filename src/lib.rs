//! Audiobook player core
//!
//! - `model`: playback state, intents, effects and the pure reducer
//! - `controller`: intent loop, effect scheduler and the engine adapter
//! - `audio`: audio engine seam and the rodio/symphonia implementation
//! - `view`: ratatui rendering of the now-playing snapshot

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod view;

#[cfg(test)]
mod testing;
