// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every stage reports failures through [`BuildError`]; only the binary
//! decides whether a failure ends the process.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Invalid combination of options. Reported before any build I/O.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Staging directory creation/deletion/copy failure.
    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single source file could not be transformed.
    #[error("Transform error: {message}\nFile   : {}\nLine   : {}\nColumn : {}", path.display(), fmt_pos(*line), fmt_pos(*column))]
    Transform {
        path: PathBuf,
        message: String,
        line: Option<u32>,
        column: Option<u32>,
    },

    /// The external compiler failed (or failed to start) for a platform.
    #[error("Platform compile error for '{platform}': {reason}")]
    PlatformCompile { platform: String, reason: String },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bundle error: {0}")]
    Bundle(#[from] zip::result::ZipError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    /// Wrap an IO error with the path it happened at.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

fn fmt_pos(pos: Option<u32>) -> String {
    pos.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string())
}

pub type Result<T> = std::result::Result<T, BuildError>;
