// src/exec/command.rs

//! Spawning external tools.
//!
//! Every command line goes through the platform shell (`sh -c` / `cmd /C`),
//! so configs can use pipes, env assignments and `npx`.

use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Result, SitepipeError};

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmd_line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    }
}

/// Replace `{key}` occurrences with their values.
///
/// Unknown placeholders are left as-is so tool syntax using braces
/// survives.
pub fn expand_placeholders(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Run `cmd_line` as a filter: `input` on stdin, stdout returned.
///
/// Tools that ignore stdin (e.g. a bundler given `{src}`) are fine; a broken
/// pipe while feeding stdin is not an error. A non-zero exit is
/// [`SitepipeError::ToolFailed`] carrying the tool's stderr.
pub async fn run_filter(cmd_line: &str, cwd: &Path, input: Vec<u8>) -> Result<Vec<u8>> {
    debug!(cmd = %cmd_line, bytes_in = input.len(), "running filter stage");

    let mut cmd = shell_command(cmd_line);
    cmd.current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{cmd_line}`"))?;

    let feeder = child.stdin.take().map(|mut stdin| {
        tokio::spawn(async move {
            // Dropping stdin afterwards closes the pipe.
            let _ = stdin.write_all(&input).await;
        })
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for `{cmd_line}`"))?;

    if let Some(feeder) = feeder {
        let _ = feeder.await;
    }

    if !output.status.success() {
        return Err(SitepipeError::ToolFailed {
            command: cmd_line.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Run a plain command to completion, forwarding its stdout to the log.
pub async fn run_command(cmd_line: &str, cwd: &Path) -> Result<()> {
    debug!(cmd = %cmd_line, "running command");

    let mut cmd = shell_command(cmd_line);
    cmd.current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .with_context(|| format!("running `{cmd_line}`"))?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        info!("{}", line);
    }

    if !output.status.success() {
        return Err(SitepipeError::ToolFailed {
            command: cmd_line.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
