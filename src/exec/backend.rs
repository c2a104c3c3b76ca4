// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning work
//! itself. This makes it easy to swap in a fake executor in tests.
//!
//! - `RealExecutorBackend` spawns one Tokio task per scheduled leaf and runs
//!   it through a [`LeafRunner`].
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which tasks were scheduled and directly emits `TaskCompleted` events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::ops::LeafRunner;

use super::task_runner::run_task;

/// Trait abstracting how scheduled tasks are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution.
    ///
    /// Implementations must eventually emit one `RuntimeEvent::TaskCompleted`
    /// per dispatched task, and must not block on the tasks themselves:
    /// tasks dispatched together run concurrently.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
pub struct RealExecutorBackend {
    runner: Arc<dyn LeafRunner>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    pub fn new(runner: Arc<dyn LeafRunner>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { runner, runtime_tx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let runner = Arc::clone(&self.runner);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            for task in tasks {
                let runner = Arc::clone(&runner);
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_task(task, runner, tx).await;
                });
            }
            Ok(())
        })
    }
}
