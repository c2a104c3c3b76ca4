// src/pipeline.rs

//! Running a [`Pipeline`]: its task tree first, then (if it succeeded) its
//! services until the user interrupts.

use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::ConfigFile;
use crate::dag::Scheduler;
use crate::engine::{CoreRuntime, RunReport, Runtime, RuntimeEvent};
use crate::errors::{Result, SitepipeError};
use crate::exec::RealExecutorBackend;
use crate::ops::LeafRunner;
use crate::service::{ServeHandle, WatchHandle};
use crate::task::{Pipeline, ServiceKind, Task};

/// Run a task tree to completion with the real executor.
///
/// Ctrl-C stops waiting; tasks that had not finished end up in
/// [`RunReport::unfinished`].
pub async fn run_task_tree(task: &Task, runner: Arc<dyn LeafRunner>) -> Result<RunReport> {
    let scheduler = Scheduler::from_task(task)?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = RealExecutorBackend::new(runner, rt_tx.clone());

    let ctrl_c = {
        let tx = rt_tx;
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        })
    };

    let core = CoreRuntime::new(scheduler);
    let report = Runtime::new(core, rt_rx, executor).run().await;
    ctrl_c.abort();
    report
}

/// Run `pipeline`'s tree, then its services.
///
/// A tree that did not fully succeed is [`SitepipeError::PipelineFailed`]
/// and no service is started.
pub async fn run_pipeline(
    pipeline: &Pipeline,
    cfg: &ConfigFile,
    project_root: &Path,
    runner: Arc<dyn LeafRunner>,
    port: Option<u16>,
) -> Result<()> {
    info!(pipeline = %pipeline.name, "pipeline started");
    let report = run_task_tree(&pipeline.task, Arc::clone(&runner)).await?;

    if !report.is_success() {
        error!(pipeline = %pipeline.name, %report, "pipeline failed");
        return Err(SitepipeError::PipelineFailed(pipeline.name.clone()));
    }
    info!(pipeline = %pipeline.name, %report, "pipeline finished");

    if pipeline.services.is_empty() {
        return Ok(());
    }
    run_services(&pipeline.services, cfg, project_root, runner, port).await
}

/// Start `services` and block until Ctrl-C or until the server exits on
/// its own, which counts as a failure.
async fn run_services(
    services: &[ServiceKind],
    cfg: &ConfigFile,
    project_root: &Path,
    runner: Arc<dyn LeafRunner>,
    port: Option<u16>,
) -> Result<()> {
    let mut serve = if services.contains(&ServiceKind::Serve) {
        Some(ServeHandle::start(cfg, project_root, port)?)
    } else {
        None
    };
    let watch = if services.contains(&ServiceKind::Watch) {
        Some(WatchHandle::start(cfg, project_root, runner)?)
    } else {
        None
    };

    info!("services running; press Ctrl-C to stop");

    let result = tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("interrupted; stopping services");
                Ok(())
            }
            Err(e) => Err(SitepipeError::from(e)),
        },
        status = wait_for_serve(&mut serve) => match status {
            Ok(status) => {
                error!(%status, "serve exited unexpectedly");
                Err(SitepipeError::from(anyhow!("serve exited unexpectedly ({status})")))
            }
            Err(e) => Err(e),
        },
    };

    if let Some(watch) = watch {
        watch.stop().await;
    }
    if let Some(serve) = serve {
        serve.stop().await?;
    }
    result
}

async fn wait_for_serve(serve: &mut Option<ServeHandle>) -> Result<ExitStatus> {
    match serve {
        Some(handle) => handle.wait().await,
        None => std::future::pending().await,
    }
}
