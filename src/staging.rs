// src/staging.rs

//! Staging area layout and preparation.
//!
//! ```text
//! <build>/
//!   last_updated            watermark sentinel (survives purges)
//!   shadowpack/             staging tree, purged on full builds
//!     src/                  resources + localisation
//!       spec/               test specs
//!     dist/
//!       <name>.zip          bundle
//!       file_map.json       platform-compile projects only
//! ```

use std::path::PathBuf;

use tracing::{debug, info};

use crate::changes::{FILE_MAP_NAME, FileSet};
use crate::errors::Result;
use crate::fs;
use crate::types::BuildMode;

/// Name of the spec directory inside the source staging root, and the
/// prefix spec files carry in the bundle manifest.
pub const SPEC_DIR: &str = "spec";

/// Every location a build writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    pub build_root: PathBuf,
    pub staging_root: PathBuf,
    pub src_root: PathBuf,
    pub dist_root: PathBuf,
    pub spec_root: PathBuf,
    pub bundle_file: PathBuf,
    pub file_map: PathBuf,
    pub sentinel: PathBuf,
}

impl StagingLayout {
    pub fn new(build_root: impl Into<PathBuf>, name: &str) -> Self {
        let build_root = build_root.into();
        let staging_root = build_root.join("shadowpack");
        let src_root = staging_root.join("src");
        let dist_root = staging_root.join("dist");
        Self {
            spec_root: src_root.join(SPEC_DIR),
            bundle_file: dist_root.join(format!("{name}.zip")),
            file_map: dist_root.join(FILE_MAP_NAME),
            sentinel: build_root.join("last_updated"),
            build_root,
            staging_root,
            src_root,
            dist_root,
        }
    }
}

/// Materialises the staging directory structure before any file is
/// written into it.
#[derive(Debug)]
pub struct StagingDirector<'a> {
    layout: &'a StagingLayout,
}

impl<'a> StagingDirector<'a> {
    pub fn new(layout: &'a StagingLayout) -> Self {
        Self { layout }
    }

    /// Prepare staging for a build.
    ///
    /// - `Full`: create the build root, purge any previous staging tree,
    ///   create the source, distribution and spec roots.
    /// - `Incremental`: purge nothing.
    ///
    /// In both modes every directory named by the change sets is then
    /// created under its staging root (resources and localisation under the
    /// source root, specs under the spec root). Any failure here is fatal.
    pub fn prepare(
        &self,
        mode: BuildMode,
        resources: &FileSet,
        i18n: &FileSet,
        specs: &FileSet,
    ) -> Result<()> {
        let layout = self.layout;

        if mode == BuildMode::Full {
            fs::ensure_dir(&layout.build_root)?;
            if layout.staging_root.exists() {
                info!(path = %layout.staging_root.display(), "purging previous staging tree");
                fs::remove_tree(&layout.staging_root)?;
            }
            fs::ensure_dir(&layout.src_root)?;
            fs::ensure_dir(&layout.dist_root)?;
            fs::ensure_dir(&layout.spec_root)?;
        } else {
            fs::ensure_dir(&layout.src_root)?;
            fs::ensure_dir(&layout.dist_root)?;
            if !specs.is_empty() {
                fs::ensure_dir(&layout.spec_root)?;
            }
        }

        fs::ensure_dirs(&layout.src_root, &resources.dirs)?;
        fs::ensure_dirs(&layout.src_root, &i18n.dirs)?;
        fs::ensure_dirs(&layout.spec_root, &specs.dirs)?;

        debug!(
            %mode,
            resource_dirs = resources.dirs.len(),
            i18n_dirs = i18n.dirs.len(),
            spec_dirs = specs.dirs.len(),
            "staging prepared"
        );
        Ok(())
    }
}
