// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::SpecFlavor;

/// Command-line arguments for `shadowpack`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shadowpack",
    version,
    about = "Incrementally build and bundle an app's web-technology sources.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Shadowpack.toml")]
    pub config: String,

    /// Target platform for the platform-compile step. Repeatable.
    ///
    /// Overrides `[platform_compile].platforms` from the project file.
    #[arg(long = "platform", value_name = "ID")]
    pub platforms: Vec<String>,

    /// Only rebuild what changed since the last successful build.
    #[arg(long)]
    pub update: bool,

    /// Run the lint pass before building.
    #[arg(long)]
    pub lint: bool,

    /// Produce a stand-alone bundle and stop (no device notification).
    #[arg(long)]
    pub bundle: bool,

    /// Push incremental builds to running instances as patches.
    #[arg(long)]
    pub patch: bool,

    /// Test framework used by spec files.
    #[arg(long, value_enum, value_name = "FLAVOR")]
    pub spec_flavor: Option<SpecFlavor>,

    /// Invoked from a watcher: transform errors are logged and skipped
    /// instead of failing the build.
    #[arg(long)]
    pub watching: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHADOWPACK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve settings and print them, but don't build anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
