// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ProjectConfig, RawProjectConfig};
use crate::errors::{BuildError, Result};

/// Default project file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "Shadowpack.toml";

/// Load a project file and return the raw, unvalidated model.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| BuildError::fs(path, e))?;

    let config: RawProjectConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a project file and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Parses `spec_flavor` / `watermark_policy` and compiles glob patterns.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ProjectConfig::try_from(raw_config)?;
    Ok(config)
}

/// Directory that relative project paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "app/Shadowpack.toml"),
///   that directory is used.
/// - A bare filename falls back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
