//! Model module - playback state and the rules that change it
//!
//! - `types`: intents, effects and subscription identities
//! - `playback`: transport state and the now-playing snapshot
//! - `reducer`: the pure transition function
//! - `catalog`: catalog resolution from a library folder
//! - `metadata`: track title lookup

mod types;
mod playback;
mod reducer;
mod catalog;
mod metadata;

pub use types::{Direction, Effect, Intent, SubscriptionId, UiState};

pub use playback::{
    next_rate, NowPlaying, PlaybackState,
    BACKWARD_STEP, DEFAULT_RATE, FORWARD_STEP, MAX_RATE, RATE_STEP,
};

pub use reducer::reduce;

pub use catalog::{Catalog, CatalogSource, DirectoryCatalog};

pub use metadata::{MetadataResolver, TagMetadata};
