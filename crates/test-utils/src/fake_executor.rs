use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use sitepipe::dag::ScheduledTask;
use sitepipe::engine::{RuntimeEvent, TaskOutcome};
use sitepipe::errors::{Result, SitepipeError};
use sitepipe::exec::ExecutorBackend;
use sitepipe::ops::LeafRunner;
use sitepipe::task::LeafKind;

/// A fake executor that:
/// - records which tasks were "run"
/// - immediately reports TaskCompleted for each scheduled task, failing
///   the ones listed in `failing`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self { runtime_tx, executed, failing: HashSet::new() }
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failing = self.failing.clone();

        Box::pin(async move {
            for t in tasks {
                {
                    let mut guard = executed.lock().unwrap();
                    guard.push(t.name.clone());
                }

                let outcome = if failing.contains(&t.name) {
                    TaskOutcome::Failed("fake failure".to_string())
                } else {
                    TaskOutcome::Success
                };

                tx.send(RuntimeEvent::TaskCompleted {
                    task: t.name.clone(),
                    outcome,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}

/// What a [`RecordingRunner`] saw, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafEvent {
    Started(LeafKind),
    Finished(LeafKind),
}

/// A `LeafRunner` that records start/finish of every leaf, optionally
/// sleeping and/or failing per leaf. Used with the real executor backend
/// to observe ordering.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    log: Arc<Mutex<Vec<LeafEvent>>>,
    failing: HashSet<LeafKind>,
    delays: HashMap<LeafKind, Duration>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, leaf: LeafKind) -> Self {
        self.failing.insert(leaf);
        self
    }

    pub fn delay(mut self, leaf: LeafKind, delay: Duration) -> Self {
        self.delays.insert(leaf, delay);
        self
    }

    pub fn events(&self) -> Vec<LeafEvent> {
        self.log.lock().unwrap().clone()
    }

    /// Leaves in the order they started.
    pub fn started(&self) -> Vec<LeafKind> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LeafEvent::Started(l) => Some(l),
                LeafEvent::Finished(_) => None,
            })
            .collect()
    }

    /// Index of `event` in the log, if it happened.
    pub fn position(&self, event: LeafEvent) -> Option<usize> {
        self.events().iter().position(|e| *e == event)
    }
}

impl LeafRunner for RecordingRunner {
    fn run_leaf(&self, leaf: LeafKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(LeafEvent::Started(leaf));

            if let Some(delay) = self.delays.get(&leaf) {
                tokio::time::sleep(*delay).await;
            }

            self.log.lock().unwrap().push(LeafEvent::Finished(leaf));

            if self.failing.contains(&leaf) {
                return Err(SitepipeError::ToolFailed {
                    command: format!("fake {leaf}"),
                    code: Some(1),
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        })
    }
}
