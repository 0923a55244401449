// src/lib.rs

pub mod bundle;
pub mod changes;
pub mod cli;
pub mod compile;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lint;
pub mod logging;
pub mod patch;
pub mod pipeline;
pub mod staging;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{BuildOptions, BuildSettings, config_root_dir, load_and_validate};
use crate::engine::{BuildOutcome, Orchestrator};

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the project file, resolves the build settings once,
/// then runs a single build.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root = config_root_dir(&config_path);
    let settings = BuildSettings::resolve(&cfg, &root, &BuildOptions::from(&args))?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    match Orchestrator::new(&settings).run().await? {
        BuildOutcome::NoChanges => info!("build finished; nothing changed"),
        BuildOutcome::Built(report) => info!(
            mode = %report.mode,
            bundle = %report.bundle.path.display(),
            files = report.bundle.manifest.len(),
            skipped = report.pipeline.failed.len(),
            "build finished"
        ),
    }
    Ok(())
}

/// Dry-run output: the resolved settings, nothing executed.
fn print_dry_run(settings: &BuildSettings) {
    println!("shadowpack dry-run");
    println!("  project     = {}", settings.name);
    println!("  resources   = {}", settings.paths.resources.display());
    println!("  i18n        = {}", settings.paths.i18n.display());
    println!("  spec        = {}", settings.paths.spec.display());
    println!("  staging     = {}", settings.layout.staging_root.display());
    println!("  bundle      = {}", settings.layout.bundle_file.display());
    println!("  update      = {}", settings.update);
    println!("  patch       = {}", settings.patch);
    println!("  bundle only = {}", settings.standalone_bundle);
    println!("  spec flavor = {}", settings.spec_flavor);
    println!("  on failure  = {:?}", settings.failure_policy);
    println!("  watermark   = {:?}", settings.watermark_policy);
    println!("  concurrency = {}", settings.concurrency);
    println!();

    match &settings.platform_compile {
        Some(pc) => {
            println!("platform compile:");
            println!("  command: {}", pc.command);
            println!("  platforms: {:?}", pc.platforms);
            println!("  output_dir: {}", pc.output_dir.display());
        }
        None => println!("platform compile: none"),
    }
    if let Some(transform) = &settings.transform {
        println!("transform: {transform}");
    }
    if let Some(lint) = &settings.lint {
        println!("lint: {} ({})", lint.command, lint.path.display());
    }

    debug!("dry-run complete (no execution)");
}
