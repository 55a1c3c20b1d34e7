//! Playback-related state and the snapshot published to the view

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ErrorInfo;

pub const BACKWARD_STEP: Duration = Duration::from_secs(5);
pub const FORWARD_STEP: Duration = Duration::from_secs(10);
pub const DEFAULT_RATE: f32 = 1.0;
pub const MAX_RATE: f32 = 2.0;
pub const RATE_STEP: f32 = 0.25;

/// Next value in the speed cycle 1.0 -> 1.25 -> ... -> 2.0 -> 1.0
pub fn next_rate(rate: f32) -> f32 {
    if rate >= MAX_RATE {
        DEFAULT_RATE
    } else {
        rate + RATE_STEP
    }
}

/// Transport state owned by the intent loop. Only the reducer mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_catalog_loaded: bool,
    pub current_time: Duration,
    pub duration: Duration,
    pub playback_rate: f32,
    pub catalog_title: Option<String>,
    pub cover_art: Option<PathBuf>,
    pub current_title: Option<String>,
    /// 1-based
    pub current_track_number: usize,
    pub track_count: usize,
    pub last_error: Option<ErrorInfo>,
    /// Bumped on every loaded track; tags metadata requests
    pub load_generation: u64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_catalog_loaded: false,
            current_time: Duration::ZERO,
            duration: Duration::ZERO,
            playback_rate: DEFAULT_RATE,
            catalog_title: None,
            cover_art: None,
            current_title: None,
            current_track_number: 1,
            track_count: 0,
            last_error: None,
            load_generation: 0,
        }
    }
}

impl PlaybackState {
    pub fn has_previous(&self) -> bool {
        self.current_track_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_track_number < self.track_count
    }

    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            catalog_title: self.catalog_title.clone(),
            title: self.current_title.clone(),
            cover_art: self.cover_art.clone(),
            current_time: self.current_time,
            duration: self.duration,
            rate: self.playback_rate,
            is_playing: self.is_playing,
            is_catalog_loaded: self.is_catalog_loaded,
            track_number: self.current_track_number,
            track_count: self.track_count,
            error_message: self.last_error.as_ref().map(|e| e.message.clone()),
        }
    }
}

/// Read-only snapshot for the view and any "now playing" consumer
#[derive(Clone, Debug, PartialEq)]
pub struct NowPlaying {
    pub catalog_title: Option<String>,
    pub title: Option<String>,
    pub cover_art: Option<PathBuf>,
    pub current_time: Duration,
    pub duration: Duration,
    pub rate: f32,
    pub is_playing: bool,
    pub is_catalog_loaded: bool,
    pub track_number: usize,
    pub track_count: usize,
    pub error_message: Option<String>,
}

impl Default for NowPlaying {
    fn default() -> Self {
        PlaybackState::default().now_playing()
    }
}

impl NowPlaying {
    /// Display title, falling back to the track number
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None if self.is_catalog_loaded => format!("Track {}", self.track_number),
            None => "Nothing loaded".to_string(),
        }
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.current_time.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        }
    }
}
