// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::dag::DagGraph;
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
    run_id: u64,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a DagGraph,
        tasks: &'a mut HashMap<TaskName, TaskInfo>,
        run_id: u64,
    ) -> Self {
        Self {
            graph,
            tasks,
            run_id,
        }
    }

    /// Mark every still-pending transitive dependent of a failed task as
    /// `Skipped`.
    ///
    /// Dependents that are already running or terminal are left alone.
    pub fn mark_dependents_skipped(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();
        let mut newly_skipped = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                if info.run_state == TaskRunState::Pending {
                    info.run_state = TaskRunState::Skipped;
                    debug!(
                        task = %info.name,
                        upstream = %failed_task,
                        "skipping task due to upstream failure"
                    );
                    newly_skipped.push(info.name.clone());
                    stack.extend(self.graph.dependents_of(&name).iter().cloned());
                }
            } else {
                warn!(task = %name, "node in DAG not present in tasks map");
            }
        }

        newly_skipped
    }

    /// Collect tasks that are `Pending` and whose dependencies all succeeded,
    /// mark them as `Running`, and return them in declaration order.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let mut candidates: Vec<(usize, TaskName)> = {
            let ro = ReadOnlyStateManager::new(self.tasks);
            self.tasks
                .values()
                .filter(|info| {
                    info.run_state == TaskRunState::Pending && ro.deps_satisfied_for_info(info)
                })
                .map(|info| (info.index, info.name.clone()))
                .collect()
        };
        candidates.sort();

        let mut ready = Vec::with_capacity(candidates.len());
        for (_, name) in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                info!(task = %info.name, run_id = self.run_id, "scheduling task");
                info.run_state = TaskRunState::Running;
                ready.push(ScheduledTask::from_task_info(info, self.run_id));
            }
        }

        ready
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks.values().all(|info| info.run_state.is_terminal())
    }
}

/// A read-only view for checking dependency satisfaction.
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a HashMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a HashMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// A node may start once every dependency has succeeded in this run.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| match self.tasks.get(dep_name) {
            Some(dep) => dep.run_state == TaskRunState::DoneSuccess,
            None => {
                warn!(
                    task = %info.name,
                    dep = %dep_name,
                    "dependency missing from tasks map"
                );
                false
            }
        })
    }
}
