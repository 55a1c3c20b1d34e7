//! Error types for the player
//!
//! Every failure that can reach the intent loop is converted into an
//! [`ErrorInfo`] at the effect boundary, so the reducer only ever sees plain
//! data and never has to handle a `Result`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures resolving a named catalog. Fatal for the session until a new
/// catalog load succeeds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog not found: {0}")]
    NotFound(String),

    #[error("Catalog has no audio files: {0}")]
    Empty(String),

    #[error("Catalog read failed: {0}")]
    Io(String),
}

/// Failures loading a single track. The catalog stays loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("Track {index} unavailable: {reason}")]
    ResourceUnavailable { index: usize, reason: String },
}

/// Attempted to move past either end of the catalog.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationBoundary {
    #[error("Already at the first track")]
    NoPrevious,

    #[error("No next track")]
    NoNext,
}

/// Failures reported by an audio engine adapter
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Audio output error: {0}")]
    Output(String),
}

/// Errors returned by the playback controller
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Track(#[from] TrackError),

    #[error(transparent)]
    Boundary(#[from] NavigationBoundary),
}

/// Where an error came from. Decides how the reducer reacts to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorOrigin {
    Catalog,
    Track,
    Navigation,
    Engine,
}

/// User-visible error carried by the `Error` intent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorInfo {
    pub origin: ErrorOrigin,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            origin,
            message: message.into(),
        }
    }

    pub fn is_catalog(&self) -> bool {
        self.origin == ErrorOrigin::Catalog
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<CatalogError> for ErrorInfo {
    fn from(err: CatalogError) -> Self {
        Self::new(ErrorOrigin::Catalog, err.to_string())
    }
}

impl From<TrackError> for ErrorInfo {
    fn from(err: TrackError) -> Self {
        Self::new(ErrorOrigin::Track, err.to_string())
    }
}

impl From<NavigationBoundary> for ErrorInfo {
    fn from(err: NavigationBoundary) -> Self {
        Self::new(ErrorOrigin::Navigation, err.to_string())
    }
}

impl From<EngineError> for ErrorInfo {
    fn from(err: EngineError) -> Self {
        Self::new(ErrorOrigin::Engine, err.to_string())
    }
}

impl From<PlaybackError> for ErrorInfo {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Track(e) => e.into(),
            PlaybackError::Boundary(e) => e.into(),
        }
    }
}
