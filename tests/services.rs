// tests/services.rs
#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sitepipe::config::ConfigFile;
use sitepipe::pipeline::run_pipeline;
use sitepipe::service::{ServeHandle, WatchHandle};
use sitepipe::task::{EntryPoint, LeafKind};
use sitepipe_test_utils::builders::shell_only_config;
use sitepipe_test_utils::fake_executor::RecordingRunner;
use sitepipe_test_utils::{init_tracing, with_timeout, write_sample_site};

/// Wait until `file` under `root` holds a pid and return it.
async fn read_pid(root: &Path, file: &str) -> u32 {
    let path = root.join(file);
    loop {
        if let Ok(text) = std::fs::read_to_string(&path) {
            if let Ok(pid) = text.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// A zombie waiting for its new parent to reap it counts as dead.
#[cfg(target_os = "linux")]
fn is_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Err(_) => false,
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .is_some_and(|rest| !rest.trim_start().starts_with('Z')),
    }
}

#[tokio::test]
async fn dev_fails_when_server_exits_after_build() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_sample_site(root);

    let cfg = shell_only_config().serve_cmd("echo Serving; exit 3").build();
    let runner = Arc::new(RecordingRunner::new());

    let err = with_timeout(run_pipeline(
        &EntryPoint::Dev.pipeline(),
        &cfg,
        root,
        runner.clone(),
        None,
    ))
    .await
    .unwrap_err();

    assert!(
        err.to_string().contains("serve exited unexpectedly"),
        "unexpected error: {err}"
    );

    let started = runner.started();
    assert_eq!(started.len(), 5, "started: {started:?}");
    assert!(started[..2].contains(&LeafKind::Clean));
    assert!(started[..2].contains(&LeafKind::OptimizeImages));
    assert_eq!(
        started[2..],
        [
            LeafKind::CompileMarkup,
            LeafKind::CompileStyles,
            LeafKind::CompileScripts
        ]
    );
}

#[tokio::test]
async fn dev_never_starts_server_after_failed_build() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let cfg = shell_only_config()
        .serve_cmd("echo started > serve.marker; sleep 60")
        .build();
    let runner = Arc::new(RecordingRunner::new().failing(LeafKind::CompileStyles));

    let result = with_timeout(run_pipeline(
        &EntryPoint::Dev.pipeline(),
        &cfg,
        root,
        runner.clone(),
        None,
    ))
    .await;

    assert!(result.is_err());
    assert!(!runner.started().contains(&LeafKind::CompileScripts));
    assert!(!root.join("serve.marker").exists());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn stopping_server_reaps_it() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let cfg = shell_only_config()
        .serve_cmd("echo $$ > serve.pid; exec sleep 60")
        .build();

    let handle = ServeHandle::start(&cfg, root, Some(4321)).unwrap();
    assert_eq!(handle.port(), 4321);

    let pid = with_timeout(read_pid(root, "serve.pid")).await;
    assert!(is_alive(pid));

    with_timeout(handle.stop()).await.unwrap();
    assert!(!Path::new(&format!("/proc/{pid}")).exists());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn stopping_server_also_stops_what_it_launched() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let cfg = shell_only_config()
        .serve_cmd("sleep 60 & echo $! > child.pid; wait")
        .build();

    let handle = ServeHandle::start(&cfg, root, None).unwrap();
    let child = with_timeout(read_pid(root, "child.pid")).await;
    assert!(is_alive(child));

    with_timeout(handle.stop()).await.unwrap();

    with_timeout(async {
        while is_alive(child) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stylesheet_edit_reruns_only_styles() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_sample_site(root);

    let cfg = ConfigFile::default();
    let runner = Arc::new(RecordingRunner::new());
    let watch = WatchHandle::start(&cfg, root, runner.clone()).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(root.join("src/scss/style.scss"), "body { color: blue; }\n").unwrap();

    with_timeout(async {
        while runner.started().is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    // Let any trailing events for the same write land.
    tokio::time::sleep(Duration::from_millis(300)).await;
    watch.stop().await;

    let started = runner.started();
    assert!(!started.is_empty());
    assert!(
        started.iter().all(|leaf| *leaf == LeafKind::CompileStyles),
        "started: {started:?}"
    );
}
