// src/changes/resolver.rs

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{BuildError, Result};
use crate::fs::relative_str;
use crate::types::Watermark;

/// Files selected from one tree, plus the directories needed to hold them.
///
/// Paths are relative to the scanned root and use forward slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    pub files: Vec<String>,
    pub dirs: BTreeSet<String>,
}

impl FileSet {
    /// Build a set from relative file paths, deriving the directory set
    /// from their ancestors.
    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: Vec<String> = files.into_iter().map(Into::into).collect();
        let mut dirs = BTreeSet::new();
        for f in &files {
            insert_ancestors(&mut dirs, f);
        }
        Self { files, dirs }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// The same set re-rooted under `prefix`, with `prefix` itself added to
    /// the directory set.
    pub fn prefixed(&self, prefix: &str) -> FileSet {
        let mut dirs: BTreeSet<String> = self
            .dirs
            .iter()
            .map(|d| format!("{prefix}/{d}"))
            .collect();
        dirs.insert(prefix.to_string());
        FileSet {
            files: self.files.iter().map(|f| format!("{prefix}/{f}")).collect(),
            dirs,
        }
    }

    /// Keep only files accepted by `keep`; the directory set is recomputed.
    pub fn retain<F>(self, mut keep: F) -> FileSet
    where
        F: FnMut(&str) -> bool,
    {
        FileSet::from_files(self.files.into_iter().filter(|f| keep(f)))
    }
}

fn insert_ancestors(dirs: &mut BTreeSet<String>, file: &str) {
    let mut cur = file;
    while let Some(idx) = cur.rfind('/') {
        cur = &cur[..idx];
        if cur.is_empty() || !dirs.insert(cur.to_string()) {
            break;
        }
    }
}

/// Scans a tree and reports which files need rebuilding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeSetResolver;

impl ChangeSetResolver {
    /// Walk `root` and collect files.
    ///
    /// - No watermark: every regular file is included.
    /// - Watermark: only files whose mtime is strictly newer.
    ///
    /// Files are listed in walk order with entries sorted by name, so two
    /// scans of an unchanged tree return the same order. A missing root is
    /// an empty tree.
    pub fn resolve(&self, root: &Path, watermark: Option<Watermark>) -> Result<FileSet> {
        if !root.is_dir() {
            debug!(root = %root.display(), "tree does not exist; nothing to scan");
            return Ok(FileSet::default());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .min_depth(1);

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                BuildError::fs(path, std::io::Error::other(e))
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(wm) = watermark {
                let meta = entry
                    .metadata()
                    .map_err(|e| BuildError::fs(entry.path(), std::io::Error::other(e)))?;
                let mtime = meta
                    .modified()
                    .map_err(|e| BuildError::fs(entry.path(), e))?;
                if !wm.is_older_than(mtime) {
                    continue;
                }
            }

            if let Some(rel) = relative_str(root, entry.path()) {
                files.push(rel);
            }
        }

        let set = FileSet::from_files(files);
        debug!(
            root = %root.display(),
            files = set.files.len(),
            dirs = set.dirs.len(),
            incremental = watermark.is_some(),
            "resolved change set"
        );
        Ok(set)
    }
}
