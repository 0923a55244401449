// src/lint.rs

//! Optional lint pass run before a build.

use std::path::Path;

use tracing::{info, warn};

use crate::config::LintSettings;
use crate::errors::Result;
use crate::exec::run_streaming;

/// Result of a lint pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintOutcome {
    Clean,
    /// The linter exited non-zero; its findings are already in the log.
    Findings(Option<i32>),
}

/// Run the configured linter over its path.
///
/// Findings never stop the build; only a linter that cannot be started is
/// an error.
pub async fn run_lint(settings: &LintSettings, cwd: &Path) -> Result<LintOutcome> {
    info!(path = %settings.path.display(), "running lint pass");

    let args = settings
        .command
        .render_args("path", &settings.path.to_string_lossy());
    let status = run_streaming(&settings.command.program, &args, cwd, "lint").await?;

    if status.success() {
        info!("lint pass clean");
        Ok(LintOutcome::Clean)
    } else {
        warn!(
            exit_code = status.code().unwrap_or(-1),
            "lint reported problems; continuing with the build"
        );
        Ok(LintOutcome::Findings(status.code()))
    }
}
