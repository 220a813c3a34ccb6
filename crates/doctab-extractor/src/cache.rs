//! Per-chunk result cache
//!
//! Layout: `{root}/{document_stem}/chunk_{position}.json`, each file holding
//! `{"schema": [...], "records": [...]}`. An entry is written once per chunk
//! and read on every later run; unreadable entries are treated as misses.

use crate::error::ExtractorError;
use doctab_domain::ExtractionResult;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// On-disk cache of chunk extraction results
#[derive(Debug, Clone)]
pub struct ChunkCache {
    root: PathBuf,
}

impl ChunkCache {
    /// Cache rooted at `root`; directories are created lazily on save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every entry of one document
    pub fn document_dir(&self, stem: &str) -> PathBuf {
        self.root.join(stem)
    }

    /// File of the entry for chunk `position` (1-based)
    pub fn entry_path(&self, stem: &str, position: usize) -> PathBuf {
        self.document_dir(stem).join(format!("chunk_{}.json", position))
    }

    /// Load a cached chunk result.
    ///
    /// Returns `None` when the file is missing, is not valid JSON, is not an
    /// object, or lacks a list-typed `schema` of strings and `records` of
    /// objects. Never fails.
    pub fn load(&self, stem: &str, position: usize) -> Option<ExtractionResult> {
        let path = self.entry_path(stem, position);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match decode_entry(&contents) {
            Some(result) => {
                debug!("Cache hit {}", path.display());
                Some(result)
            }
            None => {
                warn!("Ignoring corrupt cache entry {}", path.display());
                None
            }
        }
    }

    /// Write a chunk result, replacing any previous entry
    pub fn save(
        &self,
        stem: &str,
        position: usize,
        result: &ExtractionResult,
    ) -> Result<(), ExtractorError> {
        let dir = self.document_dir(stem);
        fs::create_dir_all(&dir).map_err(|e| {
            ExtractorError::Cache(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = self.entry_path(stem, position);
        let contents = serde_json::to_string_pretty(result)?;
        fs::write(&path, contents).map_err(|e| {
            ExtractorError::Cache(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!("Cached {}", path.display());
        Ok(())
    }

    /// Delete every entry of one document
    pub fn reset(&self, stem: &str) -> Result<(), ExtractorError> {
        let dir = self.document_dir(stem);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                debug!("Cleared cache {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExtractorError::Cache(format!(
                "Failed to clear {}: {}",
                dir.display(),
                e
            ))),
        }
    }
}

/// Decode an entry, rejecting anything but `{"schema": [...], "records": [...]}`
fn decode_entry(contents: &str) -> Option<ExtractionResult> {
    let value: Value = serde_json::from_str(contents).ok()?;
    let object = value.as_object()?;
    if !object.get("schema")?.is_array() || !object.get("records")?.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}
