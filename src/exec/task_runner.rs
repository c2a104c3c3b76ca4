// src/exec/task_runner.rs

//! Individual leaf task runner.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::ops::LeafRunner;

/// Run a single scheduled leaf and emit its `TaskCompleted` event.
///
/// Leaf errors become `TaskOutcome::Failed` carrying the error text; they are
/// never propagated further, the scheduler decides what a failure means.
pub async fn run_task(
    task: ScheduledTask,
    runner: Arc<dyn LeafRunner>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    info!(
        task = %task.name,
        leaf = %task.leaf,
        run_id = task.run_id,
        "starting task"
    );
    let started = Instant::now();

    let outcome = match runner.run_leaf(task.leaf).await {
        Ok(()) => {
            info!(
                task = %task.name,
                run_id = task.run_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "task finished"
            );
            TaskOutcome::Success
        }
        Err(err) => {
            error!(
                task = %task.name,
                run_id = task.run_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %err,
                "task failed"
            );
            TaskOutcome::Failed(err.to_string())
        }
    };

    if runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        debug!(task = %task.name, "runtime gone; dropping completion event");
    }
}
