// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::watch::dispatch::{WatchTrigger, triggers_for_event};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::RouteWatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Whether a notify event is a content change worth a rebuild.
///
/// Access and metadata events are ignored; reads done by the transforms
/// themselves would otherwise feed back into the watcher.
pub fn is_relevant(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and sends a
/// [`WatchTrigger`] for every route whose patterns match a changed path.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<RouteWatchProfile>,
    trigger_tx: mpsc::Sender<WatchTrigger>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // Fails only once the async side is gone.
                let _ = event_tx.send(event);
            }
            Err(err) => {
                eprintln!("sitepipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_relevant(&event.kind) {
                continue;
            }
            debug!(?event, "received notify event");

            let rel_paths: Vec<String> = event
                .paths
                .iter()
                .filter_map(|p| relative_str(&root, p))
                .collect();

            for trigger in triggers_for_event(&profiles, &rel_paths) {
                if trigger_tx.send(trigger).await.is_err() {
                    warn!("watch dispatcher gone; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
