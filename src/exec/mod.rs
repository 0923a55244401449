// src/exec/mod.rs

//! Process execution layer.
//!
//! The platform compiler, the lint pass and the command-based source
//! transform all shell out through [`process`]. Output is forwarded into
//! the `tracing` log; success is decided by exit status alone.

use std::future::Future;
use std::pin::Pin;

pub mod process;

pub use process::{CapturedOutput, run_capturing, run_streaming};

/// Boxed future returned by the async seams (`PlatformCompiler`,
/// `SourceTransform`, `NotificationChannel`), so they stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
