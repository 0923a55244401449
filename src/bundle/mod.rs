// src/bundle/mod.rs

//! Final assembly: pack the staged files, write the file map, advance the
//! watermark.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::changes::{FileMap, TimestampGate};
use crate::errors::Result;
use crate::fs::join_rel;
use crate::staging::StagingLayout;
use crate::types::Watermark;

pub mod pack;

pub use pack::{entries, pack};

/// The packed output of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub path: PathBuf,
    /// Bundle paths actually packed, in order.
    pub manifest: Vec<String>,
    /// Written file map, for platform-compile projects.
    pub file_map: Option<PathBuf>,
    /// New watermark, if it was advanced.
    pub watermark: Option<Watermark>,
}

/// Packs staged output into the distributable bundle.
#[derive(Debug)]
pub struct BundleAssembler<'a> {
    layout: &'a StagingLayout,
    gate: &'a TimestampGate,
}

impl<'a> BundleAssembler<'a> {
    pub fn new(layout: &'a StagingLayout, gate: &'a TimestampGate) -> Self {
        Self { layout, gate }
    }

    /// Pack `manifest` (paths relative to the source staging root).
    ///
    /// Entries with no staged file are left out with a warning. After
    /// packing, `file_map` is written if given, and the watermark sentinel
    /// is touched when `advance_watermark` is set.
    pub fn finalize(
        &self,
        manifest: Vec<String>,
        file_map: Option<&FileMap>,
        advance_watermark: bool,
    ) -> Result<Bundle> {
        let (present, missing): (Vec<String>, Vec<String>) = manifest
            .into_iter()
            .partition(|rel| join_rel(&self.layout.src_root, rel).is_file());
        for rel in &missing {
            warn!(file = %rel, "not staged; leaving it out of the bundle");
        }

        crate::fs::ensure_dir(&self.layout.dist_root)?;
        let total = pack(&self.layout.src_root, &present, &self.layout.bundle_file)?;
        info!(files = total, "file(s) bundled");

        let file_map_path = match file_map {
            Some(map) => {
                map.write(&self.layout.file_map)?;
                Some(self.layout.file_map.clone())
            }
            None => None,
        };

        let watermark = if advance_watermark {
            Some(self.gate.advance()?)
        } else {
            warn!("watermark held back; failed files will be retried next update");
            None
        };

        Ok(Bundle {
            path: self.layout.bundle_file.clone(),
            manifest: present,
            file_map: file_map_path,
            watermark,
        })
    }
}
