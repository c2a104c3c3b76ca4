// src/dag/task_info.rs

//! Task metadata and per-run state management.

use crate::engine::TaskName;
use crate::task::LeafKind;

/// Per-run state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting on dependencies.
    Pending,
    /// Dispatched to the executor.
    Running,
    DoneSuccess,
    DoneFailed,
    /// Never started because an upstream node failed.
    Skipped,
}

impl TaskRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskRunState::DoneSuccess | TaskRunState::DoneFailed | TaskRunState::Skipped
        )
    }
}

/// Static node information plus its state in the current run.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    pub leaf: LeafKind,
    /// Position in declaration order; used to keep dispatch deterministic.
    pub index: usize,
    /// Direct dependencies of this node.
    pub deps: Vec<TaskName>,
    pub run_state: TaskRunState,
    /// Failure reason, set when `run_state == DoneFailed`.
    pub failure: Option<String>,
}

impl TaskInfo {
    pub fn new(name: TaskName, leaf: LeafKind, index: usize, deps: Vec<TaskName>) -> Self {
        Self {
            name,
            leaf,
            index,
            deps,
            run_state: TaskRunState::Pending,
            failure: None,
        }
    }
}

/// Description of a task that the scheduler wants the executor to run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Node name, e.g. `clean` or `clean#2`.
    pub name: TaskName,
    pub leaf: LeafKind,
    /// Identifier of the pipeline run this dispatch belongs to.
    pub run_id: u64,
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo, run_id: u64) -> Self {
        Self {
            name: info.name.clone(),
            leaf: info.leaf,
            run_id,
        }
    }
}
