// src/exec/process.rs

//! External process invocation shared by the compiler and init actions.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Captured result of a successful process run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args` to completion.
///
/// A non-zero exit status becomes an error carrying the process diagnostic:
/// stderr if anything was written there, stdout otherwise.
pub async fn run_process(program: &str, args: &[String]) -> Result<ProcessOutput> {
    info!(program, ?args, "starting process");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("spawning process '{program}'"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    for line in stdout.lines() {
        debug!(program, "stdout: {}", line);
    }
    for line in stderr.lines() {
        debug!(program, "stderr: {}", line);
    }

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let diagnostic = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };
        bail!("'{program}' exited with status {code}: {diagnostic}");
    }

    Ok(ProcessOutput { stdout, stderr })
}
