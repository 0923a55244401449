// src/logging.rs

//! Logging setup for `shadowpack` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SHADOWPACK_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. "debug" or "shadowpack::compile=trace")
//! 3. default to `info`
//!
//! Everything goes to STDERR, which is also where forwarded compiler and
//! lint diagnostics end up.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "SHADOWPACK_LOG";

/// Initialise the global logging subscriber.
///
/// Must be called at most once per process.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(lvl.as_directive()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}
