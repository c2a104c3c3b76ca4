// src/watch/mod.rs

//! File watching and change routing.
//!
//! This module is responsible for:
//! - Compiling each route's `watch` / `exclude` globs.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Dispatching a leaf run for every matched change.
//!
//! It does **not** know about composite tasks; a change only ever re-runs
//! the single leaf of the route it belongs to.

pub mod dispatch;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use dispatch::{WatchTrigger, route_event, run_dispatcher, triggers_for_event};
pub use patterns::{RouteWatchProfile, build_route_profiles};
pub use watcher::{WatcherHandle, spawn_watcher};
