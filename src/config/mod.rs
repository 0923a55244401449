// src/config/mod.rs

//! Configuration for shadowpack.
//!
//! - `model.rs`: the TOML-backed project file.
//! - `loader.rs`: reading it from disk.
//! - `validate.rs`: turning it into a [`ProjectConfig`].
//! - `settings.rs`: folding project config and CLI options into the
//!   immutable [`BuildSettings`] every stage reads from.

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, config_root_dir, load_and_validate, load_from_path};
pub use model::{
    BuildSection, CommandSection, LintSection, PlatformCompileSection, ProjectConfig,
    ProjectSection, RawProjectConfig,
};
pub use settings::{
    BuildOptions, BuildSettings, CommandSpec, LintSettings, PlatformCompileSettings, ProjectPaths,
};
