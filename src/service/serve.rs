// src/service/serve.rs

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use regex::Regex;
use tokio::process::Child;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::errors::{Result, SitepipeError};
use crate::exec::command::shell_command;
use crate::exec::expand_placeholders;
use crate::exec::long_lived::spawn_output_monitor;

/// A running development server.
///
/// On unix the server leads its own process group and [`ServeHandle::stop`]
/// signals the whole group, so tools the command launched (`npx`, node)
/// stop with it. Dropping the handle only kills the shell wrapper, and
/// elsewhere only the wrapper is ever killed.
#[derive(Debug)]
pub struct ServeHandle {
    child: Child,
    port: u16,
}

impl ServeHandle {
    /// Start the configured server over the output root.
    ///
    /// `port` overrides `[serve].port`.
    pub fn start(cfg: &ConfigFile, project_root: &Path, port: Option<u16>) -> Result<Self> {
        let serve = cfg.serve();
        let port = port.unwrap_or(serve.port);

        let ready = serve
            .ready_on_stdout
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| SitepipeError::ConfigError(format!("serve.ready_on_stdout: {e}")))?;

        let root = cfg.output_root().to_string_lossy();
        let port_str = port.to_string();
        let cmd_line = expand_placeholders(
            &serve.cmd,
            &[("root", &*root), ("port", port_str.as_str())],
        );

        let mut cmd = shell_command(&cmd_line);
        cmd.current_dir(project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("starting server `{cmd_line}`"))?;

        spawn_output_monitor("serve", child.stdout.take(), child.stderr.take(), ready);

        info!(cmd = %cmd_line, port, "serve started");
        Ok(Self { child, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the server to exit on its own.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }

    /// Kill the server and reap it.
    pub async fn stop(mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            #[cfg(unix)]
            if let Some(pid) = self.child.id() {
                terminate_group(pid).await;
            }
            debug!("killing serve process");
            self.child.kill().await?;
        }
        info!("serve stopped");
        Ok(())
    }
}

/// Send SIGTERM to the process group led by `pid`.
#[cfg(unix)]
async fn terminate_group(pid: u32) {
    let mut cmd = shell_command(&format!("kill -TERM -- -{pid}"));
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    match cmd.status().await {
        Ok(status) if status.success() => debug!(pid, "signalled serve process group"),
        Ok(status) => debug!(pid, %status, "serve process group already gone"),
        Err(e) => debug!(pid, error = %e, "could not signal serve process group"),
    }
}
