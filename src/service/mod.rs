// src/service/mod.rs

//! Long-running services started by `dev`.
//!
//! Services are not tasks: they have no completion signal of their own and
//! are only started after the build succeeded, then stopped together.

pub mod serve;
pub mod watch;

pub use serve::ServeHandle;
pub use watch::WatchHandle;
