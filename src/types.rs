// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use clap::ValueEnum;

/// Whether a build starts from scratch or only processes changed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Purge staging and process every file.
    Full,
    /// Keep staging and process files newer than the watermark.
    Incremental,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Full => f.write_str("full"),
            BuildMode::Incremental => f.write_str("incremental"),
        }
    }
}

/// Modification time of the sentinel file written by the last successful
/// build. Files strictly newer than this are considered changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(SystemTime);

impl Watermark {
    pub fn new(time: SystemTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> SystemTime {
        self.0
    }

    /// `true` if `mtime` is strictly newer than the watermark.
    pub fn is_older_than(&self, mtime: SystemTime) -> bool {
        mtime > self.0
    }
}

/// What to do when a single source file fails to transform.
///
/// Decided once from the build options and threaded through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// One-shot builds: the build fails once every in-flight task settled.
    Abort,
    /// Watcher-driven builds: log the error, leave the file out, keep going.
    LogAndContinue,
}

impl FailurePolicy {
    pub fn from_watching(watching: bool) -> Self {
        if watching {
            FailurePolicy::LogAndContinue
        } else {
            FailurePolicy::Abort
        }
    }
}

/// Whether a build that skipped failed transforms still advances the
/// watermark.
///
/// - `Advance`: always touch the sentinel after finalisation (default).
/// - `Hold`: leave the sentinel alone if any transform failed, so the next
///   incremental build picks the failing file up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkPolicy {
    #[default]
    Advance,
    Hold,
}

impl FromStr for WatermarkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "advance" => Ok(WatermarkPolicy::Advance),
            "hold" => Ok(WatermarkPolicy::Hold),
            other => Err(format!(
                "invalid watermark_policy: {other} (expected \"advance\" or \"hold\")"
            )),
        }
    }
}

/// Test framework whose globals get injected into spec files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpecFlavor {
    #[default]
    Jasmine,
    MochaShould,
    MochaChai,
}

impl FromStr for SpecFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jasmine" => Ok(SpecFlavor::Jasmine),
            "mocha-should" => Ok(SpecFlavor::MochaShould),
            "mocha-chai" => Ok(SpecFlavor::MochaChai),
            other => Err(format!(
                "invalid spec flavor: {other} (expected \"jasmine\", \"mocha-should\" or \"mocha-chai\")"
            )),
        }
    }
}

impl fmt::Display for SpecFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpecFlavor::Jasmine => "jasmine",
            SpecFlavor::MochaShould => "mocha-should",
            SpecFlavor::MochaChai => "mocha-chai",
        };
        f.write_str(s)
    }
}
