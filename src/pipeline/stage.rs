// src/pipeline/stage.rs

use std::path::PathBuf;
use std::sync::Arc;

use globset::GlobMatcher;
use tracing::{debug, error, info, warn};

use crate::errors::{BuildError, Result};
use crate::fs::stream_copy;
use crate::pipeline::pool::run_bounded;
use crate::pipeline::shim::wrap_spec;
use crate::pipeline::transform::SourceTransform;
use crate::types::{FailurePolicy, SpecFlavor};

/// One file to move into staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTask {
    /// Path inside the bundle, e.g. `ui/view.js` or `spec/app_spec.js`.
    pub rel: String,
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// How a settled task ended.
#[derive(Debug)]
enum TaskOutcome {
    Copied,
    Transformed,
    Failed(BuildError),
}

/// What a pipeline run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub copied: usize,
    pub transformed: usize,
    /// Bundle paths whose transform failed and that were left out of
    /// staging (only possible under `FailurePolicy::LogAndContinue`).
    pub failed: Vec<String>,
}

struct Router {
    transform: Arc<dyn SourceTransform>,
    script_matcher: GlobMatcher,
    spec_matcher: GlobMatcher,
    flavor: SpecFlavor,
}

/// Routes every changed file to the right treatment and writes the result
/// into staging, with bounded parallelism.
///
/// - non-script files are stream-copied byte for byte;
/// - script files go through the [`SourceTransform`], and spec files
///   additionally get the test-framework shim of the configured flavor.
pub struct TransformPipeline {
    router: Arc<Router>,
    policy: FailurePolicy,
    concurrency: usize,
}

impl TransformPipeline {
    pub fn new(
        transform: Arc<dyn SourceTransform>,
        script_matcher: GlobMatcher,
        spec_matcher: GlobMatcher,
        flavor: SpecFlavor,
        policy: FailurePolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            router: Arc::new(Router {
                transform,
                script_matcher,
                spec_matcher,
                flavor,
            }),
            policy,
            concurrency,
        }
    }

    /// Process every task and wait for all of them to settle.
    ///
    /// A failing task never cancels its siblings. Afterwards:
    /// - any filesystem failure fails the run;
    /// - transform failures fail the run under `FailurePolicy::Abort`, and
    ///   are reported in [`PipelineReport::failed`] otherwise.
    pub async fn run(&self, tasks: Vec<TransformTask>) -> Result<PipelineReport> {
        let total = tasks.len();
        info!(tasks = total, concurrency = self.concurrency, "processing sources and assets");

        let router = Arc::clone(&self.router);
        let outcomes = run_bounded(tasks, self.concurrency, move |task| {
            let router = Arc::clone(&router);
            async move {
                let rel = task.rel.clone();
                let outcome = match process(&router, &task).await {
                    Ok(outcome) => outcome,
                    Err(err) => TaskOutcome::Failed(err),
                };
                (rel, outcome)
            }
        })
        .await?;

        let mut report = PipelineReport::default();
        let mut fs_error = None;
        let mut transform_error = None;

        for (rel, outcome) in outcomes {
            match outcome {
                TaskOutcome::Copied => report.copied += 1,
                TaskOutcome::Transformed => report.transformed += 1,
                TaskOutcome::Failed(err @ BuildError::Transform { .. }) => {
                    log_transform_error(&err);
                    report.failed.push(rel);
                    transform_error.get_or_insert(err);
                }
                TaskOutcome::Failed(err) => {
                    error!(file = %rel, error = %err, "failed to stage file");
                    fs_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = fs_error {
            return Err(err);
        }
        if let Some(err) = transform_error {
            match self.policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::LogAndContinue => warn!(
                    failed = report.failed.len(),
                    "continuing without files that failed to transform"
                ),
            }
        }

        debug!(
            copied = report.copied,
            transformed = report.transformed,
            failed = report.failed.len(),
            "pipeline settled"
        );
        Ok(report)
    }
}

async fn process(router: &Router, task: &TransformTask) -> Result<TaskOutcome> {
    if !router.script_matcher.is_match(&task.rel) {
        stream_copy(&task.src, &task.dst).await?;
        return Ok(TaskOutcome::Copied);
    }

    // Invalid UTF-8 is replaced rather than failing the build.
    let bytes = tokio::fs::read(&task.src)
        .await
        .map_err(|e| BuildError::fs(&task.src, e))?;
    let source = String::from_utf8_lossy(&bytes);

    let transformed = match router.transform.transform(&source, &task.src).await {
        Ok(text) => text,
        Err(failure) => {
            return Ok(TaskOutcome::Failed(BuildError::Transform {
                path: task.src.clone(),
                message: failure.message,
                line: failure.line,
                column: failure.column,
            }));
        }
    };

    let output = if router.spec_matcher.is_match(&task.rel) {
        wrap_spec(router.flavor, &transformed)
    } else {
        transformed
    };

    tokio::fs::write(&task.dst, output)
        .await
        .map_err(|e| BuildError::fs(&task.dst, e))?;
    Ok(TaskOutcome::Transformed)
}

fn log_transform_error(err: &BuildError) {
    if let BuildError::Transform {
        path,
        message,
        line,
        column,
    } = err
    {
        error!(
            file = %path.display(),
            line = line.unwrap_or(0),
            column = column.unwrap_or(0),
            "{message}"
        );
    }
}
