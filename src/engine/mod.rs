// src/engine/mod.rs

//! Build orchestration.
//!
//! [`Orchestrator`] runs the stages of one build in order and collects what
//! each produced into a [`BuildReport`]. It owns no state between builds:
//! everything that must survive (staging tree, file map, watermark) lives
//! on disk.

use crate::bundle::Bundle;
use crate::compile::PlatformCompileResult;
use crate::patch::Notification;
use crate::pipeline::PipelineReport;
use crate::types::BuildMode;

pub mod orchestrator;

pub use orchestrator::Orchestrator;

/// How a build ended, short of an error.
#[derive(Debug)]
pub enum BuildOutcome {
    /// Incremental build with empty change sets; nothing was written.
    NoChanges,
    Built(BuildReport),
}

/// What a finished build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub mode: BuildMode,
    pub bundle: Bundle,
    /// Per-platform compile results, empty when no platform compile ran.
    pub compile_results: Vec<PlatformCompileResult>,
    /// Localisation files copied.
    pub localized: usize,
    pub pipeline: PipelineReport,
    /// `None` for stand-alone bundles.
    pub notification: Option<Notification>,
}
