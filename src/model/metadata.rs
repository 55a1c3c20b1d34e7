//! Track title lookup

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use symphonia::core::meta::{MetadataRevision, StandardTagKey};

use crate::audio;

/// Resolves a display title for a track. Never fails: absence is `None`.
pub trait MetadataResolver: Send + Sync {
    fn title(&self, track: PathBuf) -> BoxFuture<'static, Option<String>>;
}

/// Reads the standard title tag with symphonia
#[derive(Clone, Copy, Debug, Default)]
pub struct TagMetadata;

impl MetadataResolver for TagMetadata {
    fn title(&self, track: PathBuf) -> BoxFuture<'static, Option<String>> {
        async move {
            match tokio::task::spawn_blocking(move || read_title(&track)).await {
                Ok(title) => title,
                Err(e) => {
                    tracing::warn!(error = %e, "Metadata task failed");
                    None
                }
            }
        }
        .boxed()
    }
}

fn read_title(path: &Path) -> Option<String> {
    let mut probed = match audio::probe(path) {
        Ok(probed) => probed,
        Err(e) => {
            tracing::debug!(error = %e, "No metadata available");
            return None;
        }
    };

    // Container tags win over tags found while probing (e.g. ID3).
    if let Some(title) = probed.format.metadata().current().and_then(title_tag) {
        return Some(title);
    }
    probed
        .metadata
        .get()
        .as_ref()
        .and_then(|m| m.current())
        .and_then(title_tag)
}

fn title_tag(revision: &MetadataRevision) -> Option<String> {
    revision
        .tags()
        .iter()
        .find(|tag| tag.std_key == Some(StandardTagKey::TrackTitle))
        .map(|tag| tag.value.to_string().trim().to_string())
        .filter(|title| !title.is_empty())
}
