#![allow(dead_code)]

use std::path::Path;

use shadowpack::config::{
    BuildOptions, BuildSection, BuildSettings, CommandSection, LintSection,
    PlatformCompileSection, ProjectConfig, ProjectSection, RawProjectConfig,
};
use shadowpack::errors::Result;
use shadowpack::types::SpecFlavor;

/// Builder for a project file plus the CLI options of one invocation.
///
/// Paths use the defaults (`Resources`, `i18n`, `spec`, `build`) relative
/// to whatever root is passed to [`ProjectBuilder::settings`].
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    raw: RawProjectConfig,
    options: BuildOptions,
}

impl ProjectBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            raw: RawProjectConfig {
                project: ProjectSection {
                    name: name.to_string(),
                    base: ".".into(),
                    resources: "Resources".into(),
                    i18n: "i18n".into(),
                    spec: "spec".into(),
                    build: "build".into(),
                },
                build: BuildSection::default(),
                platform_compile: None,
                transform: None,
                lint: None,
            },
            options: BuildOptions::default(),
        }
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.raw.build.concurrency = n;
        self
    }

    pub fn spec_flavor(mut self, flavor: &str) -> Self {
        self.raw.build.spec_flavor = Some(flavor.to_string());
        self
    }

    pub fn watermark_policy(mut self, policy: &str) -> Self {
        self.raw.build.watermark_policy = Some(policy.to_string());
        self
    }

    /// Turn the platform-compile step on with the given default targets.
    pub fn platform_compile(mut self, platforms: &[&str]) -> Self {
        self.raw.platform_compile = Some(PlatformCompileSection {
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            ..PlatformCompileSection::default()
        });
        self
    }

    pub fn transform(mut self, command: &str, args: &[&str]) -> Self {
        self.raw.transform = Some(CommandSection {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    pub fn lint(mut self, command: &str, args: &[&str]) -> Self {
        self.raw.lint = Some(LintSection {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            path: "Resources".into(),
        });
        self
    }

    pub fn update(mut self, on: bool) -> Self {
        self.options.update = on;
        self
    }

    pub fn patch(mut self, on: bool) -> Self {
        self.options.patch = on;
        self
    }

    pub fn standalone_bundle(mut self, on: bool) -> Self {
        self.options.bundle = on;
        self
    }

    pub fn watching(mut self, on: bool) -> Self {
        self.options.watching = on;
        self
    }

    pub fn request_lint(mut self, on: bool) -> Self {
        self.options.lint = on;
        self
    }

    pub fn flavor_override(mut self, flavor: SpecFlavor) -> Self {
        self.options.spec_flavor = Some(flavor);
        self
    }

    pub fn platforms(mut self, platforms: &[&str]) -> Self {
        self.options.platforms = platforms.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn raw(&self) -> RawProjectConfig {
        self.raw.clone()
    }

    pub fn config(&self) -> ProjectConfig {
        ProjectConfig::try_from(self.raw.clone())
            .expect("Failed to build valid config from builder")
    }

    pub fn try_settings(&self, root: &Path) -> Result<BuildSettings> {
        BuildSettings::resolve(&self.config(), root, &self.options)
    }

    pub fn settings(&self, root: &Path) -> BuildSettings {
        self.try_settings(root)
            .expect("Failed to resolve build settings from builder")
    }
}
