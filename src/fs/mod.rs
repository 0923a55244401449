// src/fs/mod.rs

//! Low-level filesystem helpers used by the build stages.
//!
//! Every failure is reported as [`BuildError::Filesystem`] carrying the
//! offending path; callers decide whether it is fatal (it always is for
//! staging).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::io::AsyncWriteExt;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{BuildError, Result};

/// Create `path` and any missing parents. Existing directories are fine.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| BuildError::fs(path, e))
}

/// Create every relative directory in `dirs` underneath `root`.
pub fn ensure_dirs<I, S>(root: &Path, dirs: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for dir in dirs {
        ensure_dir(&root.join(dir.as_ref()))?;
    }
    Ok(())
}

/// Recursively delete `path` if it exists.
pub fn remove_tree(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    debug!(path = %path.display(), "removing tree");
    fs::remove_dir_all(path).map_err(|e| BuildError::fs(path, e))
}

/// Delete a single file if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::fs(path, e)),
    }
}

/// Recursively copy `src` into `dst`.
///
/// Files that already exist in `dst` are kept as they are; only missing
/// files are copied. Returns the number of files copied.
pub fn merge_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            BuildError::fs(path, std::io::Error::other(e))
        })?;

        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            if target.exists() {
                skipped += 1;
                continue;
            }
            fs::copy(entry.path(), &target).map_err(|e| BuildError::fs(&target, e))?;
            copied += 1;
        }
    }

    debug!(
        src = %src.display(),
        dst = %dst.display(),
        copied,
        skipped,
        "merged directory tree"
    );
    Ok(copied)
}

/// Modification time of `path`, or `None` if it doesn't exist.
pub fn modified(path: &Path) -> Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| BuildError::fs(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildError::fs(path, e)),
    }
}

/// Create `path` if needed and set its modification time to now.
pub fn touch(path: &Path) -> Result<SystemTime> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BuildError::fs(path, e))?;
    let now = SystemTime::now();
    file.set_modified(now).map_err(|e| BuildError::fs(path, e))?;
    Ok(now)
}

/// Stream `src` into `dst` byte for byte.
///
/// Resolves once the destination has been flushed and closed.
pub async fn stream_copy(src: &Path, dst: &Path) -> Result<u64> {
    let mut reader = tokio::fs::File::open(src)
        .await
        .map_err(|e| BuildError::fs(src, e))?;
    let mut writer = tokio::fs::File::create(dst)
        .await
        .map_err(|e| BuildError::fs(dst, e))?;

    let bytes = tokio::io::copy(&mut reader, &mut writer)
        .await
        .map_err(|e| BuildError::fs(dst, e))?;
    writer.shutdown().await.map_err(|e| BuildError::fs(dst, e))?;

    Ok(bytes)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to canonicalising both sides when a plain `strip_prefix`
/// fails (symlinked temp dirs on macOS, for example). Returns `None` if the
/// path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

/// Join a forward-slash relative path onto `root`.
pub fn join_rel(root: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|seg| !seg.is_empty())
        .fold(root.to_path_buf(), |acc, seg| acc.join(seg))
}
