// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use globset::GlobMatcher;
use serde::Deserialize;

use crate::types::{SpecFlavor, WatermarkPolicy};

/// Project file as read from TOML, before validation.
///
/// ```toml
/// [project]
/// name = "myapp"
///
/// [build]
/// concurrency = 100
/// spec_flavor = "mocha-chai"
///
/// [platform_compile]
/// platforms = ["android", "ios"]
/// ```
///
/// Only `[project].name` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProjectConfig {
    pub project: ProjectSection,

    #[serde(default)]
    pub build: BuildSection,

    /// Presence of this section turns the platform-compile step on.
    #[serde(default)]
    pub platform_compile: Option<PlatformCompileSection>,

    /// External source transform. Without it, sources pass through as-is.
    #[serde(default)]
    pub transform: Option<CommandSection>,

    #[serde(default)]
    pub lint: Option<LintSection>,
}

/// `[project]` section. All paths are relative to `base`, which itself is
/// relative to the directory holding the project file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Used to name the bundle (`<name>.zip`).
    pub name: String,

    #[serde(default = "default_base")]
    pub base: PathBuf,

    #[serde(default = "default_resources")]
    pub resources: PathBuf,

    #[serde(default = "default_i18n")]
    pub i18n: PathBuf,

    #[serde(default = "default_spec")]
    pub spec: PathBuf,

    #[serde(default = "default_build")]
    pub build: PathBuf,
}

fn default_base() -> PathBuf {
    PathBuf::from(".")
}

fn default_resources() -> PathBuf {
    PathBuf::from("Resources")
}

fn default_i18n() -> PathBuf {
    PathBuf::from("i18n")
}

fn default_spec() -> PathBuf {
    PathBuf::from("spec")
}

fn default_build() -> PathBuf {
    PathBuf::from("build")
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Maximum in-flight tasks per worker pool.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// `"jasmine"`, `"mocha-should"` or `"mocha-chai"`.
    #[serde(default)]
    pub spec_flavor: Option<String>,

    /// Files matching this glob are run through the source transform.
    #[serde(default = "default_script_pattern")]
    pub script_pattern: String,

    /// Script files matching this glob get a test-framework shim.
    #[serde(default = "default_spec_pattern")]
    pub spec_pattern: String,

    /// `"advance"` or `"hold"`.
    #[serde(default)]
    pub watermark_policy: Option<String>,
}

fn default_concurrency() -> usize {
    100
}

fn default_script_pattern() -> String {
    "**/*.js".to_string()
}

fn default_spec_pattern() -> String {
    "**/*_spec.js".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            spec_flavor: None,
            script_pattern: default_script_pattern(),
            spec_pattern: default_spec_pattern(),
            watermark_policy: None,
        }
    }
}

/// `[platform_compile]` section.
///
/// `{platform}` in `args` is replaced by the platform identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformCompileSection {
    #[serde(default = "default_compile_command")]
    pub command: String,

    #[serde(default = "default_compile_args")]
    pub args: Vec<String>,

    /// Scratch directory the compiler writes into, relative to `base`.
    #[serde(default = "default_compile_output")]
    pub output_dir: PathBuf,

    /// Stale top-level entry point removed after a successful compile.
    #[serde(default = "default_entry_point")]
    pub entry_point: PathBuf,

    /// Targets used when none are given on the command line.
    #[serde(default)]
    pub platforms: Vec<String>,

    /// Platform id -> resource sub-directory, e.g. `ios = "iphone"`.
    #[serde(default = "default_slots")]
    pub slots: BTreeMap<String, String>,
}

fn default_compile_command() -> String {
    "alloy".to_string()
}

fn default_compile_args() -> Vec<String> {
    [
        "compile",
        "-b",
        "-l",
        "1",
        "--platform",
        "{platform}",
        "--config",
        "sourcemap=false",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_compile_output() -> PathBuf {
    PathBuf::from("Resources/alloy")
}

fn default_entry_point() -> PathBuf {
    PathBuf::from("Resources/app.js")
}

fn default_slots() -> BTreeMap<String, String> {
    BTreeMap::from([("ios".to_string(), "iphone".to_string())])
}

impl Default for PlatformCompileSection {
    fn default() -> Self {
        Self {
            command: default_compile_command(),
            args: default_compile_args(),
            output_dir: default_compile_output(),
            entry_point: default_entry_point(),
            platforms: Vec::new(),
            slots: default_slots(),
        }
    }
}

/// A plain external command, e.g. `[transform]`.
///
/// `{file}` in `args` is replaced by the path being processed.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// `[lint]` section. `{path}` in `args` is replaced by `path`.
#[derive(Debug, Clone, Deserialize)]
pub struct LintSection {
    #[serde(default = "default_lint_command")]
    pub command: String,

    #[serde(default = "default_lint_args")]
    pub args: Vec<String>,

    #[serde(default = "default_resources")]
    pub path: PathBuf,
}

fn default_lint_command() -> String {
    "jshint".to_string()
}

fn default_lint_args() -> Vec<String> {
    vec!["{path}".to_string()]
}

/// Validated project configuration.
///
/// Constructed through `TryFrom<RawProjectConfig>` (see `validate.rs`), which
/// parses the enum-valued strings and compiles the glob patterns.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub concurrency: usize,
    pub spec_flavor: SpecFlavor,
    pub watermark_policy: WatermarkPolicy,
    pub script_matcher: GlobMatcher,
    pub spec_matcher: GlobMatcher,
    pub platform_compile: Option<PlatformCompileSection>,
    pub transform: Option<CommandSection>,
    pub lint: Option<LintSection>,
}
