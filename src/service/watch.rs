// src/service/watch.rs

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::ops::LeafRunner;
use crate::watch::{WatchTrigger, WatcherHandle, build_route_profiles, run_dispatcher, spawn_watcher};

/// A running watch service: the filesystem watcher plus the dispatcher that
/// re-runs leaves.
#[derive(Debug)]
pub struct WatchHandle {
    watcher: WatcherHandle,
    dispatcher: JoinHandle<()>,
}

impl WatchHandle {
    pub fn start(cfg: &ConfigFile, project_root: &Path, runner: Arc<dyn LeafRunner>) -> Result<Self> {
        let profiles = build_route_profiles(cfg)?;
        let (tx, rx) = mpsc::channel::<WatchTrigger>(64);

        let watcher = spawn_watcher(project_root, profiles, tx)?;
        let dispatcher = tokio::spawn(run_dispatcher(rx, runner));

        info!("watch started");
        Ok(Self { watcher, dispatcher })
    }

    /// Stop watching and abort rebuilds still in flight.
    pub async fn stop(self) {
        drop(self.watcher);
        self.dispatcher.abort();
        let _ = self.dispatcher.await;
        info!("watch stopped");
    }
}
