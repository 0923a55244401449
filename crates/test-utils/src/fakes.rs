#![allow(dead_code)]

//! Scriptable stand-ins for the external collaborators of a build.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use shadowpack::compile::PlatformCompiler;
use shadowpack::errors::{BuildError, Result};
use shadowpack::exec::BoxFuture;
use shadowpack::patch::NotificationChannel;
use shadowpack::pipeline::{SourceTransform, TransformFailure};

/// A fake platform compiler that:
/// - records which platforms it was asked to compile, in order
/// - fails for platforms registered with [`FakeCompiler::failing_on`]
/// - otherwise writes one file per platform into its output directory.
#[derive(Clone, Default)]
pub struct FakeCompiler {
    output_dir: Option<PathBuf>,
    failing: BTreeSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `<platform>.js` into `dir` on every successful compile.
    pub fn writing_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn failing_on(mut self, platform: &str) -> Self {
        self.failing.insert(platform.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlatformCompiler for FakeCompiler {
    fn compile<'a>(&'a self, platform: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(platform.to_string());

            if self.failing.contains(platform) {
                return Err(BuildError::PlatformCompile {
                    platform: platform.to_string(),
                    reason: "compiler exited with code 1".to_string(),
                });
            }

            if let Some(dir) = &self.output_dir {
                fs::create_dir_all(dir).map_err(|e| BuildError::fs(dir, e))?;
                let file = dir.join(format!("{platform}.js"));
                fs::write(&file, format!("// compiled for {platform}\n"))
                    .map_err(|e| BuildError::fs(&file, e))?;
            }
            Ok(())
        })
    }
}

/// A transform that marks its output and can be told to fail on files with
/// a given name.
#[derive(Clone)]
pub struct MarkingTransform {
    marker: String,
    failing: BTreeSet<String>,
    seen: Arc<Mutex<Vec<PathBuf>>>,
}

impl MarkingTransform {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            failing: BTreeSet::new(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail (at line 3, column 7) for any file named `file_name`.
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl SourceTransform for MarkingTransform {
    fn transform<'a>(
        &'a self,
        source: &'a str,
        path: &'a Path,
    ) -> BoxFuture<'a, std::result::Result<String, TransformFailure>> {
        Box::pin(async move {
            self.seen.lock().unwrap().push(path.to_path_buf());

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Err(TransformFailure::new("Unexpected token").at(3, 7));
            }
            Ok(format!("{}{source}", self.marker))
        })
    }
}

/// One call made on a [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    Bundle(PathBuf),
    Patch(PathBuf, Vec<String>),
}

/// A notification channel that records every call.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    calls: Arc<Mutex<Vec<ChannelCall>>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ChannelCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl NotificationChannel for RecordingChannel {
    fn register_bundle<'a>(&'a self, bundle: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(ChannelCall::Bundle(bundle.to_path_buf()));
            Ok(())
        })
    }

    fn register_patch<'a>(
        &'a self,
        bundle: &'a Path,
        files: &'a [String],
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(ChannelCall::Patch(bundle.to_path_buf(), files.to_vec()));
            Ok(())
        })
    }
}
