//! Catalog resolution: a named folder of audio files plus optional cover art

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;

const COVER_IMAGE_NAME: &str = "cover.jpg";
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];
const BUNDLE_SUFFIX: &str = ".bundle";

/// Ordered tracks of one playback session. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    pub title: String,
    pub tracks: Vec<PathBuf>,
    pub cover_art: Option<PathBuf>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Path> {
        self.tracks.get(index).map(PathBuf::as_path)
    }
}

/// Something that can turn a catalog name into a [`Catalog`]
pub trait CatalogSource: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Catalog, CatalogError>;
}

/// Resolves catalogs from folders under a library root.
///
/// `<root>/<name>.bundle` is preferred, `<root>/<name>` is the fallback.
#[derive(Clone, Debug)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        let bundle = self.root.join(format!("{name}{BUNDLE_SUFFIX}"));
        if bundle.is_dir() {
            return Some(bundle);
        }
        let plain = self.root.join(name);
        plain.is_dir().then_some(plain)
    }
}

impl CatalogSource for DirectoryCatalog {
    fn resolve(&self, name: &str) -> Result<Catalog, CatalogError> {
        let dir = self
            .locate(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        let entries = fs::read_dir(&dir).map_err(|e| CatalogError::Io(e.to_string()))?;

        let mut cover_art = None;
        let mut tracks = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CatalogError::Io(e.to_string()))?.path();
            if !path.is_file() {
                continue;
            }
            if has_extension(&path, AUDIO_EXTENSIONS) {
                tracks.push(path);
            } else if has_extension(&path, IMAGE_EXTENSIONS)
                && path.file_name().is_some_and(|n| n == COVER_IMAGE_NAME)
            {
                cover_art = Some(path);
            }
        }

        if tracks.is_empty() {
            return Err(CatalogError::Empty(name.to_string()));
        }
        tracks.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::info!(
            catalog = name,
            tracks = tracks.len(),
            has_cover = cover_art.is_some(),
            "Catalog resolved"
        );

        Ok(Catalog {
            title: name.to_string(),
            tracks,
            cover_art,
        })
    }
}

fn has_extension(path: &Path, accepted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| accepted.contains(&ext.as_str()))
}
