//! The fixed, ordered list of ambient sounds offered to the user.

#[cfg(test)]
mod tests;

use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "sonocli::catalog";

/// Audio file extensions the engine can decode.
const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aac"];

/// One ambient sound: a display name (unique within the catalog) and the
/// local file it is decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundItem {
    pub name: String,
    pub path: PathBuf,
}

impl SoundItem {
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        SoundItem {
            name: name.to_string(),
            path: path.into(),
        }
    }
}

/// Error types for catalog construction.
#[derive(Debug)]
pub enum CatalogError {
    IoError(io::Error),
    DuplicateName(String),
    Empty(PathBuf),
}

impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> Self {
        CatalogError::IoError(err)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "I/O error: {}", e),
            CatalogError::DuplicateName(name) => write!(f, "Duplicate sound name: {}", name),
            CatalogError::Empty(dir) => write!(f, "No playable sounds found in {}", dir.display()),
        }
    }
}

impl Error for CatalogError {}

/// Ordered collection of sounds with unique names.
#[derive(Debug, Clone, Default)]
pub struct SoundCatalog {
    items: Vec<SoundItem>,
}

impl SoundCatalog {
    /// Builds a catalog from an explicit item list, preserving order.
    /// Rejects duplicate names so a name always identifies one sound.
    pub fn from_items(items: Vec<SoundItem>) -> Result<Self, CatalogError> {
        let mut seen: Vec<&str> = Vec::with_capacity(items.len());
        for item in &items {
            if seen.contains(&item.name.as_str()) {
                return Err(CatalogError::DuplicateName(item.name.clone()));
            }
            seen.push(&item.name);
        }
        Ok(SoundCatalog { items })
    }

    /// Scans a directory for playable audio files, one sound per file. The
    /// sound name is the file stem; entries are sorted by name so the list
    /// presented to the user is stable across runs.
    pub fn scan_dir(dir: &Path) -> Result<Self, CatalogError> {
        info!(target: LOG_TARGET, "Scanning for sounds in {}", dir.display());
        let mut items = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase());
            match ext {
                Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => {}
                _ => {
                    debug!(target: LOG_TARGET, "Skipping non-audio entry: {}", path.display());
                    continue;
                }
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => items.push(SoundItem::new(stem, path.clone())),
                None => warn!(target: LOG_TARGET, "Skipping file with unreadable name: {}", path.display()),
            }
        }

        if items.is_empty() {
            return Err(CatalogError::Empty(dir.to_path_buf()));
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));
        info!(target: LOG_TARGET, "Found {} sounds.", items.len());
        Self::from_items(items)
    }

    /// Looks up a sound by its (unique) name.
    pub fn get(&self, name: &str) -> Option<&SoundItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// The sounds, in presentation order.
    pub fn items(&self) -> &[SoundItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
