// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::StateManager;
use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{RunReport, TaskName, TaskOutcome};
use crate::errors::Result;
use crate::task::Task;

/// Scheduler holds the immutable DAG plus mutable per-run state.
///
/// It is responsible for:
/// - deciding when a node is "ready" to run (all deps succeeded)
/// - marking nodes as succeeded/failed
/// - scheduling dependents when appropriate
/// - skipping dependents when a node fails, without touching unrelated
///   nodes that are already running
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: HashMap<TaskName, TaskInfo>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    /// Construct a scheduler for a task tree.
    pub fn from_task(task: &Task) -> Result<Self> {
        Ok(Self::from_graph(DagGraph::from_task(task)?))
    }

    pub fn from_graph(graph: DagGraph) -> Self {
        let mut tasks = HashMap::new();

        for (index, name) in graph.tasks().enumerate() {
            let Some(leaf) = graph.leaf_of(name) else {
                continue;
            };
            let deps = graph.dependencies_of(name).to_vec();
            tasks.insert(
                name.to_string(),
                TaskInfo::new(name.to_string(), leaf, index, deps),
            );
        }

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// Read-only view of the given node's run state.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks.get(task).map(|info| info.run_state)
    }

    /// Node names in declaration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    /// Start a run: every node becomes `Pending` and the roots are returned.
    pub fn start_new_run(&mut self) -> SchedulerStep {
        self.run_counter += 1;
        let run_id = self.run_counter;
        self.current_run_id = Some(run_id);

        for info in self.tasks.values_mut() {
            info.run_state = TaskRunState::Pending;
            info.failure = None;
        }

        debug!(run_id, tasks = self.tasks.len(), "scheduler: starting new run");

        let mut manager = StateManager::new(&self.graph, &mut self.tasks, run_id);
        let newly_scheduled = manager.collect_new_ready_tasks();
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            run_just_finished,
            ..SchedulerStep::default()
        }
    }

    /// Handle completion of a task with a concrete outcome (production API).
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Manual-step variant of `handle_completion` that returns a rich [`SchedulerStep`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::default();
        };

        let mut step = SchedulerStep::default();

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            return step;
        };

        if info.run_state != TaskRunState::Running {
            warn!(
                task = %task,
                state = ?info.run_state,
                "completion for a task that is not running; ignoring"
            );
            return step;
        }

        match outcome {
            TaskOutcome::Success => {
                info.run_state = TaskRunState::DoneSuccess;
                debug!(task = %info.name, run_id, "task completed successfully");
                let mut manager = StateManager::new(&self.graph, &mut self.tasks, run_id);
                step.newly_scheduled = manager.collect_new_ready_tasks();
            }
            TaskOutcome::Failed(reason) => {
                info.run_state = TaskRunState::DoneFailed;
                warn!(
                    task = %info.name,
                    run_id,
                    reason = %reason,
                    "task failed; skipping its dependents in this run"
                );
                info.failure = Some(reason);
                step.newly_failed.push(task.to_string());
                let mut manager = StateManager::new(&self.graph, &mut self.tasks, run_id);
                step.newly_skipped = manager.mark_dependents_skipped(task);
            }
        }

        step.run_just_finished = self.maybe_finish_run();
        step
    }

    /// Summarise the current (or last) run.
    pub fn report(&self) -> RunReport {
        let mut report = RunReport::default();
        let mut infos: Vec<&TaskInfo> = self.tasks.values().collect();
        infos.sort_by_key(|info| info.index);

        for info in infos {
            match info.run_state {
                TaskRunState::DoneSuccess => report.succeeded.push(info.name.clone()),
                TaskRunState::DoneFailed => report.failed.push((
                    info.name.clone(),
                    info.failure.clone().unwrap_or_default(),
                )),
                TaskRunState::Skipped => report.skipped.push(info.name.clone()),
                TaskRunState::Pending | TaskRunState::Running => {
                    report.unfinished.push(info.name.clone())
                }
            }
        }

        report
    }

    /// Clear `current_run_id` once every node is terminal.
    ///
    /// Returns `true` if this call transitioned the scheduler from running
    /// to idle.
    fn maybe_finish_run(&mut self) -> bool {
        let Some(run_id) = self.current_run_id else {
            return false;
        };

        let manager = StateManager::new(&self.graph, &mut self.tasks, run_id);

        if manager.all_tasks_terminal() {
            info!(run_id, "scheduler: all tasks terminal; run finished");
            self.current_run_id = None;
            true
        } else {
            false
        }
    }
}
