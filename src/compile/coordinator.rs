// src/compile/coordinator.rs

use std::path::Path;

use tracing::{error, info};

use crate::changes::FileMap;
use crate::compile::PlatformCompiler;
use crate::config::PlatformCompileSettings;
use crate::errors::{BuildError, Result};
use crate::fs;

/// Outcome of compiling one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCompileResult {
    pub platform: String,
    pub succeeded: bool,
    /// Failure reason, if any.
    pub detail: Option<String>,
}

/// What a compile stage did.
#[derive(Debug, Clone)]
pub struct CompileReport {
    /// One entry per attempted platform, in order. Platforms after a
    /// failure are never attempted and have no entry.
    pub results: Vec<PlatformCompileResult>,
    /// Rebuilt file map; only present when every platform succeeded.
    pub file_map: Option<FileMap>,
}

impl CompileReport {
    pub fn failure(&self) -> Option<&PlatformCompileResult> {
        self.results.iter().find(|r| !r.succeeded)
    }

    pub fn succeeded(&self) -> bool {
        self.failure().is_none()
    }

    /// Turn a failed report into the build error it stands for.
    pub fn into_result(self) -> Result<Option<FileMap>> {
        if let Some(failed) = self.failure() {
            return Err(BuildError::PlatformCompile {
                platform: failed.platform.clone(),
                reason: failed.detail.clone().unwrap_or_default(),
            });
        }
        Ok(self.file_map)
    }
}

/// Drives the external compiler over the target platforms, one at a time,
/// in declared order.
pub struct PlatformCompileCoordinator<'a, C: PlatformCompiler + ?Sized> {
    settings: &'a PlatformCompileSettings,
    resources: &'a Path,
    compiler: &'a C,
}

impl<'a, C: PlatformCompiler + ?Sized> PlatformCompileCoordinator<'a, C> {
    pub fn new(settings: &'a PlatformCompileSettings, resources: &'a Path, compiler: &'a C) -> Self {
        Self {
            settings,
            resources,
            compiler,
        }
    }

    /// Compile every configured platform.
    ///
    /// Stops at the first platform that fails; later platforms are skipped
    /// and output already merged for earlier ones stays where it is. After
    /// a clean run the compiler's scratch directory and the stale entry
    /// point are removed and the file map is rebuilt.
    ///
    /// Returns `Err` only for filesystem failures while merging or
    /// cleaning up; compiler failures are reported in the
    /// [`CompileReport`].
    pub async fn run(&self) -> Result<CompileReport> {
        let mut results = Vec::with_capacity(self.settings.platforms.len());

        for platform in &self.settings.platforms {
            info!(platform = %platform, "compiling for platform");

            match self.compiler.compile(platform).await {
                Ok(()) => {
                    self.merge_output(platform)?;
                    results.push(PlatformCompileResult {
                        platform: platform.clone(),
                        succeeded: true,
                        detail: None,
                    });
                }
                Err(err) => {
                    error!(platform = %platform, error = %err, "platform compile failed");
                    let reason = match err {
                        BuildError::PlatformCompile { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    results.push(PlatformCompileResult {
                        platform: platform.clone(),
                        succeeded: false,
                        detail: Some(reason),
                    });
                    return Ok(CompileReport {
                        results,
                        file_map: None,
                    });
                }
            }
        }

        self.clean_up()?;
        let file_map = FileMap::build(self.resources)?;

        Ok(CompileReport {
            results,
            file_map: Some(file_map),
        })
    }

    /// Merge a platform's compiled output into its resource slot, if the
    /// compiler produced any.
    fn merge_output(&self, platform: &str) -> Result<()> {
        let output = &self.settings.output_dir;
        if !output.is_dir() {
            info!(platform, "compiler produced no output directory; nothing to merge");
            return Ok(());
        }

        let slot = self.settings.slot_dir(self.resources, platform);
        fs::ensure_dir(&slot)?;
        let copied = fs::merge_tree(output, &slot)?;
        info!(
            platform,
            slot = %slot.display(),
            files = copied,
            "merged compiled output into resources"
        );
        Ok(())
    }

    fn clean_up(&self) -> Result<()> {
        fs::remove_tree(&self.settings.output_dir)?;
        if fs::remove_file_if_exists(&self.settings.entry_point)? {
            info!(path = %self.settings.entry_point.display(), "removed stale entry point");
        }
        Ok(())
    }
}
