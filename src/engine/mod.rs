// src/engine/mod.rs

//! Orchestration engine for sitepipe.
//!
//! This module ties together:
//! - the DAG scheduler
//! - the runtime event loop that reacts to task completion events and
//!   shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::fmt;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Completion signal of a leaf task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Failed, with a human-readable reason from the underlying tool.
    Failed(String),
}

/// Events flowing into the runtime from the executor and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task finished with a concrete outcome.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Stop waiting (e.g. Ctrl-C). In-flight tasks are not awaited.
    ShutdownRequested,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: Vec<TaskName>,
    /// Failed tasks and their failure reasons.
    pub failed: Vec<(TaskName, String)>,
    /// Tasks that never started because something upstream failed.
    pub skipped: Vec<TaskName>,
    /// Tasks still pending or running when the runtime stopped (shutdown).
    pub unfinished: Vec<TaskName>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty() && self.unfinished.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped",
            self.succeeded.len(),
            self.failed.len(),
            self.skipped.len()
        )?;
        if !self.unfinished.is_empty() {
            write!(f, ", {} unfinished", self.unfinished.len())?;
        }
        for (task, reason) in &self.failed {
            write!(f, "\n  {task}: {reason}")?;
        }
        Ok(())
    }
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
