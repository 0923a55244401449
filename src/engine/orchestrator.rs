// src/engine/orchestrator.rs

use std::sync::Arc;

use tracing::{info, warn};

use crate::bundle::BundleAssembler;
use crate::changes::{ChangeSetResolver, FileMap, FileSet, TimestampGate};
use crate::compile::{CommandCompiler, PlatformCompileCoordinator, PlatformCompiler};
use crate::config::BuildSettings;
use crate::errors::{BuildError, Result};
use crate::fs::join_rel;
use crate::lint::run_lint;
use crate::patch::{LoggingChannel, NotificationChannel, PatchNotifier};
use crate::pipeline::{
    CommandTransform, IdentityTransform, LocalizationCopier, SourceTransform, TransformPipeline,
    TransformTask,
};
use crate::staging::{SPEC_DIR, StagingDirector};
use crate::types::{BuildMode, Watermark, WatermarkPolicy};

use super::{BuildOutcome, BuildReport};

/// Change sets of the three source trees.
struct ChangeSets {
    resources: FileSet,
    i18n: FileSet,
    specs: FileSet,
}

impl ChangeSets {
    fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.i18n.is_empty() && self.specs.is_empty()
    }
}

/// Drives one build through its stages, in order:
///
/// lint → mode → platform compile → change sets → staging →
/// {localisation, transform} → bundle → notify.
///
/// Collaborators that talk to the outside world (compiler, transform,
/// notification channel) are trait objects so tests can substitute them.
pub struct Orchestrator<'a> {
    settings: &'a BuildSettings,
    compiler: Option<Arc<dyn PlatformCompiler>>,
    transform: Arc<dyn SourceTransform>,
    channel: Arc<dyn NotificationChannel>,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator with the production collaborators implied by
    /// `settings`.
    pub fn new(settings: &'a BuildSettings) -> Self {
        let base = settings.paths.base.clone();

        let compiler = settings.platform_compile.as_ref().map(|pc| {
            Arc::new(CommandCompiler::new(pc.command.clone(), base.clone()))
                as Arc<dyn PlatformCompiler>
        });
        let transform: Arc<dyn SourceTransform> = match &settings.transform {
            Some(cmd) => Arc::new(CommandTransform::new(cmd.clone(), base)),
            None => Arc::new(IdentityTransform),
        };

        Self {
            settings,
            compiler,
            transform,
            channel: Arc::new(LoggingChannel),
        }
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn PlatformCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn SourceTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_channel(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.channel = channel;
        self
    }

    /// Run the build.
    ///
    /// Any error aborts the build before the watermark moves; a failed
    /// compile stage aborts before staging is touched.
    pub async fn run(&self) -> Result<BuildOutcome> {
        let s = self.settings;

        if let Some(lint) = &s.lint {
            run_lint(lint, &s.paths.base).await?;
        }

        info!(project = %s.name, "beginning build");
        let gate = TimestampGate::new(&s.layout.sentinel);
        let (mode, watermark) = gate.resolve_mode(s.update)?;

        let mut compile_results = Vec::new();
        let mut file_map = None;
        if let Some(pc) = &s.platform_compile {
            let compiler = self.compiler.as_deref().ok_or_else(|| {
                BuildError::Configuration("no platform compiler available".to_string())
            })?;
            let coordinator = PlatformCompileCoordinator::new(pc, &s.paths.resources, compiler);
            let report = coordinator.run().await?;
            compile_results = report.results.clone();
            file_map = report.into_result()?;
        }

        let changes = self.resolve_changes(mode, watermark, file_map.as_ref())?;
        if mode == BuildMode::Incremental && changes.is_empty() {
            warn!("nothing to update");
            return Ok(BuildOutcome::NoChanges);
        }

        StagingDirector::new(&s.layout).prepare(
            mode,
            &changes.resources,
            &changes.i18n,
            &changes.specs,
        )?;

        let specs = changes.specs.prefixed(SPEC_DIR);
        let tasks = self.transform_tasks(&changes.resources, &changes.specs);

        let copier = LocalizationCopier::new(s.concurrency);
        let pipeline = TransformPipeline::new(
            Arc::clone(&self.transform),
            s.script_matcher.clone(),
            s.spec_matcher.clone(),
            s.spec_flavor,
            s.failure_policy,
            s.concurrency,
        );

        let (localized, pipeline_report) = tokio::join!(
            copier.run(&changes.i18n, &s.paths.i18n, &s.layout.src_root),
            pipeline.run(tasks),
        );
        let localized = localized?;
        let pipeline_report = pipeline_report?;

        // Files that failed to transform are neither bundled nor recorded in
        // the file map, so the next incremental build retries them.
        let failed = &pipeline_report.failed;
        if let Some(map) = file_map.as_mut() {
            for rel in failed {
                map.forget(rel);
            }
        }
        let manifest: Vec<String> = changes
            .resources
            .files
            .iter()
            .chain(changes.i18n.files.iter())
            .chain(specs.files.iter())
            .filter(|rel| !failed.contains(*rel))
            .cloned()
            .collect();

        let advance = match s.watermark_policy {
            WatermarkPolicy::Advance => true,
            WatermarkPolicy::Hold => pipeline_report.failed.is_empty(),
        };
        let bundle = BundleAssembler::new(&s.layout, &gate).finalize(
            manifest,
            file_map.as_ref(),
            advance,
        )?;

        let notification = if s.standalone_bundle {
            info!(bundle = %bundle.path.display(), "bundle ready");
            None
        } else {
            let notifier = PatchNotifier::new(self.channel.as_ref(), &s.script_matcher);
            Some(
                notifier
                    .notify(mode, s.patch, &bundle.path, &bundle.manifest)
                    .await?,
            )
        };

        Ok(BuildOutcome::Built(BuildReport {
            mode,
            bundle,
            compile_results,
            localized,
            pipeline: pipeline_report,
            notification,
        }))
    }

    fn resolve_changes(
        &self,
        mode: BuildMode,
        watermark: Option<Watermark>,
        file_map: Option<&FileMap>,
    ) -> Result<ChangeSets> {
        let s = self.settings;
        let resolver = ChangeSetResolver;

        let mut resources = resolver.resolve(&s.paths.resources, watermark)?;
        if mode == BuildMode::Incremental {
            if let Some(current) = file_map {
                if let Some(previous) = FileMap::load(&s.layout.file_map)? {
                    resources = current.filter_changed(&previous, resources);
                }
            }
        }

        let changes = ChangeSets {
            resources,
            i18n: resolver.resolve(&s.paths.i18n, watermark)?,
            specs: resolver.resolve(&s.paths.spec, watermark)?,
        };
        info!(
            %mode,
            resources = changes.resources.len(),
            i18n = changes.i18n.len(),
            specs = changes.specs.len(),
            "change sets resolved"
        );
        Ok(changes)
    }

    fn transform_tasks(&self, resources: &FileSet, specs: &FileSet) -> Vec<TransformTask> {
        let s = self.settings;

        let resource_tasks = resources.files.iter().map(|rel| TransformTask {
            rel: rel.clone(),
            src: join_rel(&s.paths.resources, rel),
            dst: join_rel(&s.layout.src_root, rel),
        });
        let spec_tasks = specs.files.iter().map(|rel| TransformTask {
            rel: format!("{SPEC_DIR}/{rel}"),
            src: join_rel(&s.paths.spec, rel),
            dst: join_rel(&s.layout.spec_root, rel),
        });

        resource_tasks.chain(spec_tasks).collect()
    }
}
