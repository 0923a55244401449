// src/compile/command.rs

use std::path::PathBuf;

use crate::compile::PlatformCompiler;
use crate::config::CommandSpec;
use crate::errors::{BuildError, Result};
use crate::exec::{BoxFuture, run_streaming};

/// Runs the configured external compiler once per platform.
///
/// `{platform}` in the argument template is replaced by the platform id.
/// The compiler's stderr is forwarded into the log; exit code 0 is the only
/// success signal.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: CommandSpec,
    cwd: PathBuf,
}

impl CommandCompiler {
    pub fn new(command: CommandSpec, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }
}

impl PlatformCompiler for CommandCompiler {
    fn compile<'a>(&'a self, platform: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let args = self.command.render_args("platform", platform);
            let label = format!("compile:{platform}");

            let status = run_streaming(&self.command.program, &args, &self.cwd, &label)
                .await
                .map_err(|e| BuildError::PlatformCompile {
                    platform: platform.to_string(),
                    reason: format!("{e:#}"),
                })?;

            if status.success() {
                Ok(())
            } else {
                Err(BuildError::PlatformCompile {
                    platform: platform.to_string(),
                    reason: match status.code() {
                        Some(code) => format!("compiler exited with code {code}"),
                        None => "compiler terminated by signal".to_string(),
                    },
                })
            }
        })
    }
}
