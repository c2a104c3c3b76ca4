// src/watch/dispatch.rs

//! Turning matched changes into leaf runs.
//!
//! There is no debouncing and no coalescing: every trigger starts its own
//! run of the matching leaf, concurrently with any run already in flight.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::ops::LeafRunner;
use crate::task::LeafKind;

use super::patterns::RouteWatchProfile;

/// A change that should re-run `leaf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTrigger {
    pub leaf: LeafKind,
    /// Path (relative to the project root) that caused the trigger.
    pub path: String,
}

/// Leaves whose routes are interested in `rel_path`.
pub fn route_event(profiles: &[RouteWatchProfile], rel_path: &str) -> Vec<LeafKind> {
    profiles
        .iter()
        .filter(|p| p.matches(rel_path))
        .map(|p| p.leaf())
        .collect()
}

/// Triggers for one filesystem event touching `rel_paths`.
///
/// Each leaf fires at most once per event, attributed to the first path
/// that matched it.
pub fn triggers_for_event(profiles: &[RouteWatchProfile], rel_paths: &[String]) -> Vec<WatchTrigger> {
    let mut triggers: Vec<WatchTrigger> = Vec::new();
    for path in rel_paths {
        for leaf in route_event(profiles, path) {
            if !triggers.iter().any(|t| t.leaf == leaf) {
                triggers.push(WatchTrigger {
                    leaf,
                    path: path.clone(),
                });
            }
        }
    }
    triggers
}

/// Run leaves for incoming triggers until the channel closes.
///
/// Leaf failures are logged and never stop the loop. Dropping (aborting)
/// this future aborts the runs it started.
pub async fn run_dispatcher(mut rx: mpsc::Receiver<WatchTrigger>, runner: Arc<dyn LeafRunner>) {
    let mut running = JoinSet::new();

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(trigger) = maybe else { break };
                info!(leaf = %trigger.leaf, path = %trigger.path, "change detected");

                let runner = Arc::clone(&runner);
                running.spawn(async move {
                    match runner.run_leaf(trigger.leaf).await {
                        Ok(()) => info!(leaf = %trigger.leaf, "rebuilt"),
                        Err(err) => error!(leaf = %trigger.leaf, error = %err, "rebuild failed"),
                    }
                });
            }
            Some(_) = running.join_next(), if !running.is_empty() => {}
        }
    }

    while running.join_next().await.is_some() {}
}
