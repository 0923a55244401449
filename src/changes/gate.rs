// src/changes/gate.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{BuildError, Result};
use crate::fs;
use crate::types::{BuildMode, Watermark};

/// Decides between full and incremental builds from the watermark sentinel.
///
/// The sentinel's modification time *is* the watermark; its contents are
/// never read.
#[derive(Debug, Clone)]
pub struct TimestampGate {
    sentinel: PathBuf,
}

impl TimestampGate {
    pub fn new(sentinel: impl Into<PathBuf>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    pub fn sentinel(&self) -> &Path {
        &self.sentinel
    }

    /// Current watermark, if a previous build left one.
    pub fn current(&self) -> Result<Option<Watermark>> {
        Ok(fs::modified(&self.sentinel)?.map(Watermark::new))
    }

    /// Resolve the mode for this build.
    ///
    /// - update not requested: `Full`, no watermark.
    /// - update requested and sentinel present: `Incremental` with its mtime.
    /// - update requested and no sentinel: configuration error, since there
    ///   is nothing to update against.
    pub fn resolve_mode(&self, update_requested: bool) -> Result<(BuildMode, Option<Watermark>)> {
        if !update_requested {
            debug!("update not requested; full build");
            return Ok((BuildMode::Full, None));
        }

        match self.current()? {
            Some(watermark) => {
                info!(sentinel = %self.sentinel.display(), "incremental build against previous watermark");
                Ok((BuildMode::Incremental, Some(watermark)))
            }
            None => Err(BuildError::Configuration(format!(
                "update requested but no previous build was found (missing {})",
                self.sentinel.display()
            ))),
        }
    }

    /// Record a successful build by touching the sentinel.
    pub fn advance(&self) -> Result<Watermark> {
        let now = fs::touch(&self.sentinel)?;
        debug!(sentinel = %self.sentinel.display(), "watermark advanced");
        Ok(Watermark::new(now))
    }
}
