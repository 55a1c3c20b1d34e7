//! Engine adapter: owns the catalog, the track index and the single live
//! track handle

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{AudioEngine, TrackHandle};
use crate::error::{NavigationBoundary, PlaybackError, TrackError};
use crate::model::{Catalog, Direction, DEFAULT_RATE};

/// One sample of the live handle, taken by the tick stream
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    pub position: Duration,
    pub duration: Duration,
    pub finished: bool,
}

pub struct PlaybackController {
    engine: Arc<dyn AudioEngine>,
    catalog: Option<Catalog>,
    index: usize,
    handle: Option<Box<dyn TrackHandle>>,
    rate: f32,
}

impl PlaybackController {
    pub fn new(engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            engine,
            catalog: None,
            index: 0,
            handle: None,
            rate: DEFAULT_RATE,
        }
    }

    /// Replace the catalog and rewind to its first track. The previous
    /// handle is released.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.handle = None;
        self.index = 0;
        self.catalog = Some(catalog);
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_track(&self) -> Option<PathBuf> {
        self.catalog
            .as_ref()
            .and_then(|c| c.track(self.index))
            .map(|p| p.to_path_buf())
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the track at `index`, carrying the current rate over.
    /// Returns `(duration, index)`.
    pub fn load_track(&mut self, index: usize) -> Result<(Duration, usize), TrackError> {
        let path = self
            .catalog
            .as_ref()
            .and_then(|c| c.track(index))
            .map(|p| p.to_path_buf())
            .ok_or_else(|| TrackError::ResourceUnavailable {
                index,
                reason: "index out of range".to_string(),
            })?;

        // Release first: only one handle may be live.
        self.handle = None;

        let mut handle = self
            .engine
            .open(&path)
            .map_err(|e| TrackError::ResourceUnavailable {
                index,
                reason: e.to_string(),
            })?;
        handle.set_rate(self.rate);

        let duration = handle.duration();
        self.handle = Some(handle);
        self.index = index;

        tracing::info!(index, path = %path.display(), ?duration, rate = self.rate, "Track loaded");
        Ok((duration, index))
    }

    pub fn load_current(&mut self) -> Result<(Duration, usize), TrackError> {
        self.load_track(self.index)
    }

    /// Start playback, loading the current track first if nothing is loaded.
    /// Without a catalog this is a no-op.
    pub fn play(&mut self) -> Result<(), TrackError> {
        if self.catalog.is_none() {
            return Ok(());
        }
        if self.handle.is_none() {
            self.load_current()?;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.play();
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pause();
        }
    }

    /// Out-of-range seeks (at or past the end) are dropped.
    pub fn seek(&mut self, to: Duration) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        if to >= handle.duration() {
            tracing::debug!(?to, duration = ?handle.duration(), "Ignoring seek past end");
            return;
        }
        handle.seek(to);
    }

    /// Load the neighbouring track. Boundaries are errors, never wrap.
    pub fn advance(&mut self, direction: Direction) -> Result<(Duration, usize), PlaybackError> {
        let count = self.catalog.as_ref().map_or(0, Catalog::len);
        let target = match direction {
            Direction::Previous => self
                .index
                .checked_sub(1)
                .ok_or(NavigationBoundary::NoPrevious)?,
            Direction::Next => {
                let next = self.index + 1;
                if next >= count {
                    return Err(NavigationBoundary::NoNext.into());
                }
                next
            }
        };
        Ok(self.load_track(target)?)
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
        if let Some(handle) = self.handle.as_mut() {
            handle.set_rate(rate);
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn sample(&self) -> Option<PositionSample> {
        self.handle.as_ref().map(|h| PositionSample {
            position: h.position(),
            duration: h.duration(),
            finished: h.is_finished(),
        })
    }
}
