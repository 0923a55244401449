// src/pipeline/mod.rs

//! Moving changed files into staging.
//!
//! - [`pool`]: bounded-parallelism worker pool shared by both stages.
//! - [`stage`]: the transform pipeline for resources and specs.
//! - [`localize`]: the localisation copier.
//! - [`transform`]: the pluggable source transform.
//! - [`shim`]: test-framework shims for spec files.

pub mod localize;
pub mod pool;
pub mod shim;
pub mod stage;
pub mod transform;

pub use localize::LocalizationCopier;
pub use pool::run_bounded;
pub use shim::wrap_spec;
pub use stage::{PipelineReport, TransformPipeline, TransformTask};
pub use transform::{
    CommandTransform, IdentityTransform, SourceTransform, TransformFailure, parse_failure,
};
