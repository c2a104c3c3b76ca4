// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` the runtime uses in production; tests can swap in
//!   a fake implementation.
//! - [`task_runner`] runs one scheduled leaf and reports its completion.
//! - [`command`] spawns external tools through the platform shell, either as
//!   stdin→stdout filters or as plain commands.
//! - [`long_lived`] watches the output of long-running service processes.

pub mod backend;
pub mod command;
pub mod long_lived;
pub mod task_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use command::{expand_placeholders, run_command, run_filter};
