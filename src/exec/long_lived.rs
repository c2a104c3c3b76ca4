// src/exec/long_lived.rs

use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tracing::{debug, info};

/// Attach output handlers to a long-running service process.
///
/// This is fire-and-forget: it spawns background Tokio tasks that drain the
/// pipes (so OS buffers never fill) and log each line at debug. The first
/// stdout line matching `ready` is logged at info as the service being ready.
pub fn spawn_output_monitor(
    service: &str,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    ready: Option<Regex>,
) {
    if let Some(stdout) = stdout {
        let name = service.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut ready = ready;

            while let Ok(Some(line)) = lines.next_line().await {
                debug!(service = %name, "stdout: {}", line);

                if ready.as_ref().is_some_and(|re| re.is_match(&line)) {
                    info!(service = %name, output = %line.trim(), "service ready");
                    ready = None;
                }
            }

            debug!(service = %name, "stdout monitor ended");
        });
    }

    if let Some(stderr) = stderr {
        let name = service.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(service = %name, "stderr: {}", line);
            }
        });
    }
}
