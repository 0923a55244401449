// src/changes/file_map.rs

//! Derived file-hash map for platform-compile projects.
//!
//! The map records a blake3 hash per resource file. It is rebuilt after
//! every successful compile stage, written next to the bundle, and used on
//! the next incremental build to drop files the compiler rewrote without
//! actually changing.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::changes::resolver::FileSet;
use crate::errors::{BuildError, Result};
use crate::fs::relative_str;

/// File name of the map inside the distribution staging root.
pub const FILE_MAP_NAME: &str = "file_map.json";

/// Compute the hash of a single file.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = File::open(path).map_err(|e| BuildError::fs(path, e))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| BuildError::fs(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Relative path -> blake3 hex digest, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap {
    entries: BTreeMap<String, String>,
}

impl FileMap {
    /// Hash every regular file below `root`.
    pub fn build(root: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();

        if root.is_dir() {
            for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
                let entry = entry
                    .with_context(|| format!("walking {} for the file map", root.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(rel) = relative_str(root, entry.path()) {
                    entries.insert(rel, compute_file_hash(entry.path())?);
                }
            }
        }

        info!(root = %root.display(), files = entries.len(), "rebuilt file map");
        Ok(Self { entries })
    }

    /// Load a previously written map; `None` if there is none.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path).map_err(|e| BuildError::fs(path, e))?;
        let map: FileMap = serde_json::from_reader(std::io::BufReader::new(file))?;
        debug!(path = %path.display(), files = map.entries.len(), "loaded file map");
        Ok(Some(map))
    }

    /// Write the map as pretty JSON (keys sorted).
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            crate::fs::ensure_dir(parent)?;
        }
        let file = File::create(path).map_err(|e| BuildError::fs(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| BuildError::fs(path, e))?;
        debug!(path = %path.display(), files = self.entries.len(), "wrote file map");
        Ok(())
    }

    pub fn get(&self, rel: &str) -> Option<&str> {
        self.entries.get(rel).map(String::as_str)
    }

    /// Drop `rel` from the map, so the next comparison treats it as new.
    pub fn forget(&mut self, rel: &str) -> bool {
        self.entries.remove(rel).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` if `rel` is new or hashes differently than in `previous`.
    pub fn differs_from(&self, previous: &FileMap, rel: &str) -> bool {
        match (self.get(rel), previous.get(rel)) {
            (Some(now), Some(before)) => now != before,
            _ => true,
        }
    }

    /// Restrict a change set to files whose content actually changed.
    pub fn filter_changed(&self, previous: &FileMap, set: FileSet) -> FileSet {
        let before = set.len();
        let filtered = set.retain(|rel| self.differs_from(previous, rel));
        debug!(
            before,
            after = filtered.len(),
            "filtered change set against previous file map"
        );
        filtered
    }
}
