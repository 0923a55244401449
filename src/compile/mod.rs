// src/compile/mod.rs

//! Platform-specific precompilation.
//!
//! The coordinator talks to a [`PlatformCompiler`] rather than spawning
//! processes itself, so tests can script per-platform outcomes without a
//! real compiler on the machine. Production uses [`CommandCompiler`].

use crate::errors::Result;
use crate::exec::BoxFuture;

pub mod command;
pub mod coordinator;

pub use command::CommandCompiler;
pub use coordinator::{CompileReport, PlatformCompileCoordinator, PlatformCompileResult};

/// Compiles the project for one target platform.
///
/// Implementations must only resolve `Ok(())` when the compiler signalled
/// success; a compiler that could not be started is a failure too.
pub trait PlatformCompiler: Send + Sync {
    fn compile<'a>(&'a self, platform: &'a str) -> BoxFuture<'a, Result<()>>;
}
