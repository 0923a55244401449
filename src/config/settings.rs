// src/config/settings.rs

//! The immutable settings a build runs with.
//!
//! [`BuildSettings`] is resolved exactly once, from the validated
//! [`ProjectConfig`] plus the per-invocation [`BuildOptions`], and then
//! handed by reference to every stage. Nothing downstream reads the
//! project file or the CLI again.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::GlobMatcher;

use crate::cli::CliArgs;
use crate::config::model::ProjectConfig;
use crate::errors::{BuildError, Result};
use crate::staging::StagingLayout;
use crate::types::{FailurePolicy, SpecFlavor, WatermarkPolicy};

/// Per-invocation options (the CLI surface of a build).
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Overrides `[platform_compile].platforms` when non-empty.
    pub platforms: Vec<String>,
    pub update: bool,
    pub lint: bool,
    /// Stand-alone bundle: stop after finalisation, notify nobody.
    pub bundle: bool,
    pub patch: bool,
    pub spec_flavor: Option<SpecFlavor>,
    pub watching: bool,
}

impl From<&CliArgs> for BuildOptions {
    fn from(args: &CliArgs) -> Self {
        Self {
            platforms: args.platforms.clone(),
            update: args.update,
            lint: args.lint,
            bundle: args.bundle,
            patch: args.patch,
            spec_flavor: args.spec_flavor,
            watching: args.watching,
        }
    }
}

/// An external program plus argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments with every `{key}` replaced by `value`.
    pub fn render_args(&self, key: &str, value: &str) -> Vec<String> {
        let placeholder = format!("{{{key}}}");
        self.args
            .iter()
            .map(|a| a.replace(&placeholder, value))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// Absolute source trees of the project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub base: PathBuf,
    pub resources: PathBuf,
    pub i18n: PathBuf,
    pub spec: PathBuf,
}

/// Resolved `[platform_compile]` settings.
#[derive(Debug, Clone)]
pub struct PlatformCompileSettings {
    pub command: CommandSpec,
    /// Absolute scratch directory the compiler writes into.
    pub output_dir: PathBuf,
    /// Absolute path of the stale entry point to remove.
    pub entry_point: PathBuf,
    /// Platforms to compile, in order.
    pub platforms: Vec<String>,
    pub slots: BTreeMap<String, String>,
}

impl PlatformCompileSettings {
    /// Where a platform's compiled output is merged into the resource tree:
    /// `<resources>/<slot>/<output dir name>`.
    pub fn slot_dir(&self, resources: &Path, platform: &str) -> PathBuf {
        let slot = self
            .slots
            .get(platform)
            .map(String::as_str)
            .unwrap_or(platform);
        let leaf = self
            .output_dir
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("compiled"));
        resources.join(slot).join(leaf)
    }
}

/// Resolved lint settings; only present when a lint pass was requested.
#[derive(Debug, Clone)]
pub struct LintSettings {
    pub command: CommandSpec,
    pub path: PathBuf,
}

/// Everything a build needs to know, fixed for the build's duration.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub name: String,
    pub paths: ProjectPaths,
    pub layout: StagingLayout,
    pub update: bool,
    pub lint: Option<LintSettings>,
    pub standalone_bundle: bool,
    pub patch: bool,
    pub spec_flavor: SpecFlavor,
    pub failure_policy: FailurePolicy,
    pub watermark_policy: WatermarkPolicy,
    pub concurrency: usize,
    pub script_matcher: GlobMatcher,
    pub spec_matcher: GlobMatcher,
    pub platform_compile: Option<PlatformCompileSettings>,
    pub transform: Option<CommandSpec>,
}

impl BuildSettings {
    /// Fold the project config and CLI options into build settings.
    ///
    /// `root` is the directory the project file lives in; `[project].base`
    /// is resolved against it.
    pub fn resolve(config: &ProjectConfig, root: &Path, options: &BuildOptions) -> Result<Self> {
        let base = root.join(&config.project.base);
        let paths = ProjectPaths {
            resources: base.join(&config.project.resources),
            i18n: base.join(&config.project.i18n),
            spec: base.join(&config.project.spec),
            base: base.clone(),
        };
        let layout = StagingLayout::new(base.join(&config.project.build), &config.project.name);

        let platform_compile = match &config.platform_compile {
            Some(pc) => {
                let platforms = if options.platforms.is_empty() {
                    pc.platforms.clone()
                } else {
                    options.platforms.clone()
                };
                if platforms.is_empty() {
                    return Err(BuildError::Configuration(
                        "platform-compile projects need at least one target: pass --platform \
                         or set [platform_compile].platforms"
                            .to_string(),
                    ));
                }
                Some(PlatformCompileSettings {
                    command: CommandSpec::new(pc.command.clone(), pc.args.clone()),
                    output_dir: base.join(&pc.output_dir),
                    entry_point: base.join(&pc.entry_point),
                    platforms,
                    slots: pc.slots.clone(),
                })
            }
            None => None,
        };

        let lint = if options.lint {
            let section = config.lint.as_ref().ok_or_else(|| {
                BuildError::Configuration(
                    "--lint was requested but the project file has no [lint] section".to_string(),
                )
            })?;
            Some(LintSettings {
                command: CommandSpec::new(section.command.clone(), section.args.clone()),
                path: base.join(&section.path),
            })
        } else {
            None
        };

        Ok(Self {
            name: config.project.name.clone(),
            paths,
            layout,
            update: options.update,
            lint,
            standalone_bundle: options.bundle,
            patch: options.patch,
            spec_flavor: options.spec_flavor.unwrap_or(config.spec_flavor),
            failure_policy: FailurePolicy::from_watching(options.watching),
            watermark_policy: config.watermark_policy,
            concurrency: config.concurrency,
            script_matcher: config.script_matcher.clone(),
            spec_matcher: config.spec_matcher.clone(),
            platform_compile,
            transform: config
                .transform
                .as_ref()
                .map(|t| CommandSpec::new(t.command.clone(), t.args.clone())),
        })
    }
}
