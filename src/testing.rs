//! Scripted collaborators injected in place of the live adapters

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use crate::audio::{AudioEngine, TrackHandle};
use crate::error::{CatalogError, EngineError};
use crate::model::{Catalog, CatalogSource, MetadataResolver};

#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Open(PathBuf),
    Play,
    Pause,
    Seek(Duration),
    SetRate(f32),
}

#[derive(Debug)]
struct LiveTrack {
    position: Duration,
    finished: bool,
    rate: f32,
}

/// Engine whose tracks never touch a device. Durations are registered per
/// path; unknown paths fail to open.
#[derive(Clone)]
pub struct FakeEngine {
    durations: Arc<Mutex<HashMap<PathBuf, Duration>>>,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    live: Arc<Mutex<LiveTrack>>,
    open_handles: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            durations: Arc::default(),
            calls: Arc::default(),
            live: Arc::new(Mutex::new(LiveTrack {
                position: Duration::ZERO,
                finished: false,
                rate: 1.0,
            })),
            open_handles: Arc::default(),
        }
    }

    pub fn with_track(self, path: impl Into<PathBuf>, duration: Duration) -> Self {
        self.durations.lock().unwrap().insert(path.into(), duration);
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    pub fn live_rate(&self) -> f32 {
        self.live.lock().unwrap().rate
    }

    pub fn set_position(&self, position: Duration) {
        self.live.lock().unwrap().position = position;
    }

    pub fn finish(&self) {
        self.live.lock().unwrap().finished = true;
    }
}

impl AudioEngine for FakeEngine {
    fn open(&self, path: &Path) -> Result<Box<dyn TrackHandle>, EngineError> {
        self.calls.lock().unwrap().push(EngineCall::Open(path.to_path_buf()));
        let duration = self
            .durations
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .ok_or_else(|| EngineError::Decode {
                path: path.to_path_buf(),
                reason: "not registered".to_string(),
            })?;

        *self.live.lock().unwrap() = LiveTrack {
            position: Duration::ZERO,
            finished: false,
            rate: 1.0,
        };
        self.open_handles.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeTrack {
            duration,
            calls: self.calls.clone(),
            live: self.live.clone(),
            open_handles: self.open_handles.clone(),
        }))
    }
}

struct FakeTrack {
    duration: Duration,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    live: Arc<Mutex<LiveTrack>>,
    open_handles: Arc<AtomicUsize>,
}

impl FakeTrack {
    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TrackHandle for FakeTrack {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn play(&mut self) {
        self.record(EngineCall::Play);
    }

    fn pause(&mut self) {
        self.record(EngineCall::Pause);
    }

    fn seek(&mut self, to: Duration) {
        self.record(EngineCall::Seek(to));
        self.live.lock().unwrap().position = to;
    }

    fn set_rate(&mut self, rate: f32) {
        self.record(EngineCall::SetRate(rate));
        self.live.lock().unwrap().rate = rate;
    }

    fn position(&self) -> Duration {
        self.live.lock().unwrap().position
    }

    fn is_finished(&self) -> bool {
        self.live.lock().unwrap().finished
    }
}

impl Drop for FakeTrack {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Catalog of `count` tracks named `<title>/NN.mp3`
pub fn catalog(title: &str, count: usize) -> Catalog {
    Catalog {
        title: title.to_string(),
        tracks: (1..=count)
            .map(|n| PathBuf::from(format!("{title}/{n:02}.mp3")))
            .collect(),
        cover_art: Some(PathBuf::from(format!("{title}/cover.jpg"))),
    }
}

#[derive(Clone, Default)]
pub struct FakeCatalogs {
    catalogs: HashMap<String, Catalog>,
}

impl FakeCatalogs {
    pub fn with(mut self, catalog: Catalog) -> Self {
        self.catalogs.insert(catalog.title.clone(), catalog);
        self
    }
}

impl CatalogSource for FakeCatalogs {
    fn resolve(&self, name: &str) -> Result<Catalog, CatalogError> {
        self.catalogs
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }
}

#[derive(Clone, Default)]
pub struct FakeMetadata {
    titles: HashMap<PathBuf, String>,
}

impl FakeMetadata {
    pub fn with_title(mut self, track: impl Into<PathBuf>, title: &str) -> Self {
        self.titles.insert(track.into(), title.to_string());
        self
    }
}

impl MetadataResolver for FakeMetadata {
    fn title(&self, track: PathBuf) -> BoxFuture<'static, Option<String>> {
        let title = self.titles.get(&track).cloned();
        async move { title }.boxed()
    }
}
