// src/bundle/pack.rs

//! Zip packing of the staged tree.
//!
//! Entries are written in manifest order with a fixed timestamp and fixed
//! permissions, so the same staged files always produce the same bytes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::errors::{BuildError, Result};
use crate::fs::join_rel;

fn entry_options() -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Pack `manifest` (paths relative to `root`) into a zip at `bundle`.
///
/// The archive is written next to its destination and renamed into place,
/// so a failed pack leaves any previous bundle untouched. The partial file
/// is removed on failure.
pub fn pack(root: &Path, manifest: &[String], bundle: &Path) -> Result<usize> {
    let partial = bundle.with_extension("zip.partial");

    if let Err(err) = write_archive(root, manifest, &partial) {
        if let Err(cleanup) = std::fs::remove_file(&partial) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %partial.display(),
                    error = %cleanup,
                    "could not remove partial bundle"
                );
            }
        }
        return Err(err);
    }

    std::fs::rename(&partial, bundle).map_err(|e| BuildError::fs(bundle, e))?;
    debug!(bundle = %bundle.display(), entries = manifest.len(), "bundle packed");
    Ok(manifest.len())
}

fn write_archive(root: &Path, manifest: &[String], partial: &Path) -> Result<()> {
    let file = File::create(partial).map_err(|e| BuildError::fs(partial, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = entry_options();

    for rel in manifest {
        let src = join_rel(root, rel);
        let mut reader =
            BufReader::new(File::open(&src).map_err(|e| BuildError::fs(&src, e))?);
        zip.start_file(rel.as_str(), options)?;
        io::copy(&mut reader, &mut zip).map_err(|e| BuildError::fs(&src, e))?;
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer).map_err(|e| BuildError::fs(partial, e))?;
    Ok(())
}

/// Entry names of a packed bundle, in archive order.
pub fn entries(bundle: &Path) -> Result<Vec<String>> {
    let file = File::open(bundle).map_err(|e| BuildError::fs(bundle, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}
