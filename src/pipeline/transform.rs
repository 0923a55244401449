// src/pipeline/transform.rs

//! The source transform seam.
//!
//! Minification/transpilation itself is somebody else's job: the pipeline
//! only needs "text in, text out, or a located error".

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::CommandSpec;
use crate::exec::{BoxFuture, run_capturing};

/// A located transform failure (typically a syntax error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformFailure {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl TransformFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for TransformFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(l), Some(c)) => write!(f, "{} (line {l}, column {c})", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Turns the text of one script file into its shipped form.
pub trait SourceTransform: Send + Sync {
    fn transform<'a>(
        &'a self,
        source: &'a str,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<String, TransformFailure>>;
}

/// Ships sources unchanged. Used when no `[transform]` is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl SourceTransform for IdentityTransform {
    fn transform<'a>(
        &'a self,
        source: &'a str,
        _path: &'a Path,
    ) -> BoxFuture<'a, Result<String, TransformFailure>> {
        Box::pin(async move { Ok(source.to_string()) })
    }
}

/// Pipes each source through an external command.
///
/// The source text goes to stdin and `{file}` in the arguments is replaced
/// by its path; stdout is the transformed text. A non-zero exit is a
/// failure whose message is the command's stderr, with the line/column
/// picked out of it when it names one.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    command: CommandSpec,
    cwd: PathBuf,
}

impl CommandTransform {
    pub fn new(command: CommandSpec, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }
}

impl SourceTransform for CommandTransform {
    fn transform<'a>(
        &'a self,
        source: &'a str,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<String, TransformFailure>> {
        Box::pin(async move {
            let args = self
                .command
                .render_args("file", &path.to_string_lossy());
            let out = run_capturing(&self.command.program, &args, &self.cwd, source)
                .await
                .map_err(|e| TransformFailure::new(format!("{e:#}")))?;

            if out.status.success() {
                Ok(out.stdout)
            } else {
                Err(parse_failure(&out.stderr))
            }
        })
    }
}

static LINE_COL_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bline\W{0,6}(\d+)\D{1,12}col(?:umn)?\W{0,6}(\d+)").expect("valid regex")
});

static LINE_COL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+):(\d+)").expect("valid regex"));

/// Build a failure from a transformer's stderr.
///
/// Understands both "line 3, col 7" style and "file.js:3:7" style locations.
pub fn parse_failure(stderr: &str) -> TransformFailure {
    let message = stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("transform failed")
        .to_string();

    let caps = LINE_COL_WORDS
        .captures(stderr)
        .or_else(|| LINE_COL_PAIR.captures(stderr));

    let location = caps.and_then(|c| {
        let line = c.get(1)?.as_str().parse().ok()?;
        let column = c.get(2)?.as_str().parse().ok()?;
        Some((line, column))
    });

    match location {
        Some((line, column)) => TransformFailure::new(message).at(line, column),
        None => TransformFailure::new(message),
    }
}
