// src/exec/process.rs

//! Running external programs with `tokio::process`.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Exit status plus everything the process wrote.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args...` in `cwd`, forwarding its output to the log line by
/// line, and wait for it to exit.
///
/// stderr carries diagnostics and is logged at info; stdout at debug. The
/// only error is failing to spawn or wait on the process; a non-zero exit is
/// reported through the returned status.
pub async fn run_streaming(
    program: &str,
    args: &[String],
    cwd: &Path,
    label: &str,
) -> Result<ExitStatus> {
    info!(label, program, ?args, "starting process");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning '{program}' for {label}"))?;

    let stdout = child.stdout.take().map(|s| {
        let label = label.to_string();
        tokio::spawn(forward_lines(s, label, false))
    });
    let stderr = child.stderr.take().map(|s| {
        let label = label.to_string();
        tokio::spawn(forward_lines(s, label, true))
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for '{program}' ({label})"))?;

    // Drain the readers so no diagnostic line is lost after exit.
    for handle in [stdout, stderr].into_iter().flatten() {
        let _ = handle.await;
    }

    info!(
        label,
        program,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "process exited"
    );
    Ok(status)
}

async fn forward_lines<R>(reader: R, label: String, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            info!(label = %label, "{}", line);
        } else {
            debug!(label = %label, "stdout: {}", line);
        }
    }
}

/// Run `program args...`, feed `input` on stdin and capture both output
/// streams.
pub async fn run_capturing(
    program: &str,
    args: &[String],
    cwd: &Path,
    input: &str,
) -> Result<CapturedOutput> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning '{program}'"))?;

    // Write stdin from its own task so a chatty child can't deadlock us on a
    // full stdout pipe.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_string();
        tokio::spawn(async move {
            let res = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            res
        })
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for '{program}'"))?;

    if let Some(handle) = writer {
        match handle.await {
            Ok(Ok(())) => {}
            // The child may exit without reading all of its input; its exit
            // status is what counts.
            Ok(Err(e)) => debug!(program, error = %e, "stdin closed early"),
            Err(e) => debug!(program, error = %e, "stdin writer task failed"),
        }
    }

    Ok(CapturedOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
