//! Core type definitions for the intent loop

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ErrorInfo;

/// Direction of a track change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Everything that can drive a state transition: user and remote commands as
/// well as completions fed back by effects.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    LoadCatalog { name: String },
    TogglePlayPause,
    /// Force playback on, regardless of the current state
    Play,
    Pause,
    Seek(Duration),
    SkipBack,
    SkipForward,
    PreviousTrack,
    NextTrack,
    SetSpeed,
    Tick(Duration),
    CatalogLoaded {
        title: String,
        cover: Option<PathBuf>,
        count: usize,
    },
    TrackLoaded {
        duration: Duration,
        index: usize,
    },
    MetadataResolved {
        title: Option<String>,
        generation: u64,
    },
    Error(ErrorInfo),
    DismissError,
}

/// Identity under which a cancellable subscription is registered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionId {
    CurrentTimeUpdater,
}

/// Work the reducer asks the outside world to do
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    ResolveCatalog { name: String },
    /// Load the controller's current track
    LoadTrack,
    /// Move one track and force playback once loaded
    Navigate(Direction),
    ResolveMetadata { generation: u64 },
    Play,
    Pause,
    Seek(Duration),
    SetRate(f32),
    /// Start the tick stream under `id`. With `cancel_in_flight` a running
    /// subscription under the same identity is cancelled first.
    Subscribe {
        id: SubscriptionId,
        cancel_in_flight: bool,
    },
    Cancel(SubscriptionId),
    Dispatch(Intent),
}

/// Terminal-only state that never reaches the reducer
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub show_help_popup: bool,
    pub should_quit: bool,
}

impl Effect {
    pub fn start_ticks() -> Self {
        Effect::Subscribe {
            id: SubscriptionId::CurrentTimeUpdater,
            cancel_in_flight: true,
        }
    }

    pub fn stop_ticks() -> Self {
        Effect::Cancel(SubscriptionId::CurrentTimeUpdater)
    }
}
