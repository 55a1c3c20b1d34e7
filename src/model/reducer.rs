//! Transport rules
//!
//! [`reduce`] is the only place that mutates [`PlaybackState`]. It is pure:
//! no engine calls, no timers, no channel sends. Anything that has to happen
//! outside the state is returned as an [`Effect`] for the scheduler to run, and
//! the results come back later as new intents.

use std::time::Duration;

use crate::error::{CatalogError, ErrorInfo, NavigationBoundary};

use super::playback::{next_rate, PlaybackState, BACKWARD_STEP, FORWARD_STEP};
use super::types::{Direction, Effect, Intent};

/// Apply `intent` to `state` and return the effects to perform, in order.
///
/// Total over all inputs. Transport intents are ignored while no catalog is
/// loaded.
pub fn reduce(state: &mut PlaybackState, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::LoadCatalog { name } => vec![Effect::ResolveCatalog { name }],

        Intent::CatalogLoaded { title, cover, count } => catalog_loaded(state, title, cover, count),

        Intent::TrackLoaded { duration, index } => {
            if !state.is_catalog_loaded {
                return Vec::new();
            }
            state.duration = duration;
            state.current_time = Duration::ZERO;
            state.current_track_number = index + 1;
            state.current_title = None;
            state.load_generation += 1;
            vec![
                Effect::ResolveMetadata {
                    generation: state.load_generation,
                },
                Effect::start_ticks(),
            ]
        }

        Intent::TogglePlayPause => {
            if !state.is_catalog_loaded {
                Vec::new()
            } else if state.is_playing {
                pause(state)
            } else {
                play(state)
            }
        }

        Intent::Play => {
            if !state.is_catalog_loaded {
                return Vec::new();
            }
            play(state)
        }

        Intent::Pause => {
            if !state.is_catalog_loaded || !state.is_playing {
                return Vec::new();
            }
            pause(state)
        }

        Intent::SkipBack => {
            if !state.is_catalog_loaded {
                return Vec::new();
            }
            let target = state.current_time.saturating_sub(BACKWARD_STEP);
            state.current_time = target;
            vec![Effect::Seek(target)]
        }

        Intent::SkipForward => {
            if !state.is_catalog_loaded {
                return Vec::new();
            }
            // Near the end we hand over to next-track instead of clamping.
            if state.current_time < state.duration.saturating_sub(FORWARD_STEP) {
                let target = state.current_time + FORWARD_STEP;
                state.current_time = target;
                vec![Effect::Seek(target)]
            } else {
                vec![Effect::Dispatch(Intent::NextTrack)]
            }
        }

        Intent::PreviousTrack => {
            if state.is_catalog_loaded && state.has_previous() {
                vec![Effect::Navigate(Direction::Previous)]
            } else {
                Vec::new()
            }
        }

        Intent::NextTrack => {
            if !state.is_catalog_loaded {
                Vec::new()
            } else if state.has_next() {
                vec![Effect::Navigate(Direction::Next)]
            } else {
                state.last_error = Some(NavigationBoundary::NoNext.into());
                Vec::new()
            }
        }

        Intent::Seek(time) => {
            if !state.is_catalog_loaded || time > state.duration {
                return Vec::new();
            }
            state.current_time = time;
            vec![Effect::Seek(time)]
        }

        Intent::SetSpeed => {
            if !state.is_catalog_loaded {
                return Vec::new();
            }
            state.playback_rate = next_rate(state.playback_rate);
            vec![Effect::SetRate(state.playback_rate)]
        }

        Intent::Tick(time) => {
            if !state.is_catalog_loaded {
                return Vec::new();
            }
            // Exact match only: the end-of-resource signal reports the
            // duration itself, ordinary samples never reach it.
            if !state.duration.is_zero() && time == state.duration {
                state.current_time = time;
                return vec![Effect::Dispatch(Intent::NextTrack)];
            }
            state.current_time = if state.duration.is_zero() {
                time
            } else {
                time.min(state.duration)
            };
            Vec::new()
        }

        Intent::MetadataResolved { title, generation } => {
            if generation == state.load_generation {
                state.current_title = title;
            }
            Vec::new()
        }

        Intent::Error(info) => fail(state, info),

        Intent::DismissError => {
            state.last_error = None;
            Vec::new()
        }
    }
}

fn catalog_loaded(
    state: &mut PlaybackState,
    title: String,
    cover: Option<std::path::PathBuf>,
    count: usize,
) -> Vec<Effect> {
    if count == 0 {
        return fail(state, CatalogError::Empty(title).into());
    }

    let mut effects = Vec::with_capacity(2);
    if state.is_playing {
        state.is_playing = false;
        effects.push(Effect::stop_ticks());
    }

    state.is_catalog_loaded = true;
    state.catalog_title = Some(title);
    state.cover_art = cover;
    state.track_count = count;
    state.current_track_number = 1;
    state.current_time = Duration::ZERO;
    state.current_title = None;

    effects.push(Effect::LoadTrack);
    effects
}

fn play(state: &mut PlaybackState) -> Vec<Effect> {
    state.is_playing = true;
    vec![Effect::Play, Effect::start_ticks()]
}

fn pause(state: &mut PlaybackState) -> Vec<Effect> {
    state.is_playing = false;
    vec![Effect::Pause, Effect::stop_ticks()]
}

fn fail(state: &mut PlaybackState, info: ErrorInfo) -> Vec<Effect> {
    let mut effects = Vec::new();
    if info.is_catalog() {
        // The ticker runs while paused too, so it is always cancelled.
        effects = if state.is_playing {
            pause(state)
        } else {
            vec![Effect::stop_ticks()]
        };
        state.is_catalog_loaded = false;
    }
    state.last_error = Some(info);
    effects
}
