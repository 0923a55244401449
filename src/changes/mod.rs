// src/changes/mod.rs

//! Change detection.
//!
//! - [`gate`]: full vs incremental, and the watermark itself.
//! - [`resolver`]: which files in a tree changed since the watermark.
//! - [`file_map`]: content hashes for platform-compile projects.
//!
//! Change detection is by modification time only. Coarse filesystem
//! timestamps or clock skew can hide an edit made in the same tick as the
//! previous build; this is a known limitation.

pub mod file_map;
pub mod gate;
pub mod resolver;

pub use file_map::{FILE_MAP_NAME, FileMap, compute_file_hash};
pub use gate::TimestampGate;
pub use resolver::{ChangeSetResolver, FileSet};
