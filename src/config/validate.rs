// src/config/validate.rs

use globset::{Glob, GlobMatcher};

use crate::config::model::{ProjectConfig, RawProjectConfig};
use crate::errors::{BuildError, Result};
use crate::types::{SpecFlavor, WatermarkPolicy};

impl TryFrom<RawProjectConfig> for ProjectConfig {
    type Error = BuildError;

    fn try_from(raw: RawProjectConfig) -> std::result::Result<Self, Self::Error> {
        validate_project(&raw)?;
        validate_build(&raw)?;
        validate_commands(&raw)?;

        let spec_flavor = match raw.build.spec_flavor.as_deref() {
            Some(s) => s.parse::<SpecFlavor>().map_err(BuildError::Configuration)?,
            None => SpecFlavor::default(),
        };
        let watermark_policy = match raw.build.watermark_policy.as_deref() {
            Some(s) => s
                .parse::<WatermarkPolicy>()
                .map_err(BuildError::Configuration)?,
            None => WatermarkPolicy::default(),
        };

        Ok(ProjectConfig {
            script_matcher: compile_glob("script_pattern", &raw.build.script_pattern)?,
            spec_matcher: compile_glob("spec_pattern", &raw.build.spec_pattern)?,
            concurrency: raw.build.concurrency,
            spec_flavor,
            watermark_policy,
            project: raw.project,
            platform_compile: raw.platform_compile,
            transform: raw.transform,
            lint: raw.lint,
        })
    }
}

fn validate_project(cfg: &RawProjectConfig) -> Result<()> {
    if cfg.project.name.trim().is_empty() {
        return Err(BuildError::Configuration(
            "[project].name must not be empty".to_string(),
        ));
    }
    if cfg.project.name.contains(['/', '\\']) {
        return Err(BuildError::Configuration(format!(
            "[project].name '{}' must not contain path separators",
            cfg.project.name
        )));
    }
    Ok(())
}

fn validate_build(cfg: &RawProjectConfig) -> Result<()> {
    if cfg.build.concurrency == 0 {
        return Err(BuildError::Configuration(
            "[build].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_commands(cfg: &RawProjectConfig) -> Result<()> {
    if let Some(pc) = &cfg.platform_compile {
        if pc.command.trim().is_empty() {
            return Err(BuildError::Configuration(
                "[platform_compile].command must not be empty".to_string(),
            ));
        }
        if !pc.args.iter().any(|a| a.contains("{platform}")) {
            return Err(BuildError::Configuration(
                "[platform_compile].args must pass the platform via a {platform} placeholder"
                    .to_string(),
            ));
        }
    }
    if let Some(t) = &cfg.transform {
        if t.command.trim().is_empty() {
            return Err(BuildError::Configuration(
                "[transform].command must not be empty".to_string(),
            ));
        }
    }
    if let Some(l) = &cfg.lint {
        if l.command.trim().is_empty() {
            return Err(BuildError::Configuration(
                "[lint].command must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn compile_glob(field: &str, pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| {
            BuildError::Configuration(format!(
                "[build].{field} is not a valid glob ({pattern}): {e}"
            ))
        })
}
