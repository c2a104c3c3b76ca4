// tests/composer_semantics.rs

use std::sync::Arc;
use std::time::Duration;

use sitepipe::pipeline::run_task_tree;
use sitepipe::task::entry::{build_task, deploy_task};
use sitepipe::task::{LeafKind, Task};
use sitepipe_test_utils::fake_executor::{LeafEvent, RecordingRunner};
use sitepipe_test_utils::{init_tracing, with_timeout};

use LeafKind::*;

#[tokio::test]
async fn sequential_failure_never_starts_next_step() {
    init_tracing();

    let runner = RecordingRunner::new().failing(CompileMarkup);
    let task = Task::sequential(
        "seq",
        vec![Task::leaf(CompileMarkup), Task::leaf(CompileStyles)],
    );

    let report = with_timeout(run_task_tree(&task, Arc::new(runner.clone())))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "markup");
    assert_eq!(report.skipped, vec!["styles".to_string()]);
    assert_eq!(runner.started(), vec![CompileMarkup]);
}

#[tokio::test]
async fn parallel_failure_still_waits_for_siblings() {
    init_tracing();

    let runner = RecordingRunner::new()
        .failing(CompileMarkup)
        .delay(CompileStyles, Duration::from_millis(100));
    let task = Task::parallel(
        "par",
        vec![Task::leaf(CompileMarkup), Task::leaf(CompileStyles)],
    );

    let report = with_timeout(run_task_tree(&task, Arc::new(runner.clone())))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.succeeded, vec!["styles".to_string()]);
    assert!(report.unfinished.is_empty());
    // The run only ended after the slow sibling finished.
    assert!(runner.position(LeafEvent::Finished(CompileStyles)).is_some());
}

#[tokio::test]
async fn parallel_children_start_before_either_finishes() {
    init_tracing();

    let runner = RecordingRunner::new()
        .delay(CompileMarkup, Duration::from_millis(50))
        .delay(CompileStyles, Duration::from_millis(50));
    let task = Task::parallel(
        "par",
        vec![Task::leaf(CompileMarkup), Task::leaf(CompileStyles)],
    );

    let report = with_timeout(run_task_tree(&task, Arc::new(runner.clone())))
        .await
        .unwrap();
    assert!(report.is_success());

    let first_finish = runner
        .events()
        .iter()
        .position(|e| matches!(e, LeafEvent::Finished(_)))
        .unwrap();
    let starts_before = runner.events()[..first_finish]
        .iter()
        .filter(|e| matches!(e, LeafEvent::Started(_)))
        .count();
    assert_eq!(starts_before, 2);
}

#[tokio::test]
async fn failure_in_nested_sequence_does_not_stop_parallel_sibling() {
    init_tracing();

    let runner = RecordingRunner::new().failing(OptimizeImages);
    let task = Task::parallel(
        "outer",
        vec![
            Task::sequential(
                "left",
                vec![Task::leaf(OptimizeImages), Task::leaf(CompileMarkup)],
            ),
            Task::sequential(
                "right",
                vec![Task::leaf(CompileStyles), Task::leaf(CompileScripts)],
            ),
        ],
    );

    let report = with_timeout(run_task_tree(&task, Arc::new(runner.clone())))
        .await
        .unwrap();

    assert_eq!(report.skipped, vec!["markup".to_string()]);
    assert_eq!(
        report.succeeded,
        vec!["styles".to_string(), "scripts".to_string()]
    );
}

#[tokio::test]
async fn build_runs_assets_in_declared_order_after_prepare() {
    init_tracing();

    let runner = RecordingRunner::new();
    let report = with_timeout(run_task_tree(&build_task(), Arc::new(runner.clone())))
        .await
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.succeeded.len(), 5);

    let pos = |e| runner.position(e).unwrap();
    let markup_start = pos(LeafEvent::Started(CompileMarkup));
    assert!(pos(LeafEvent::Finished(Clean)) < markup_start);
    assert!(pos(LeafEvent::Finished(OptimizeImages)) < markup_start);
    assert!(pos(LeafEvent::Finished(CompileMarkup)) < pos(LeafEvent::Started(CompileStyles)));
    assert!(pos(LeafEvent::Finished(CompileStyles)) < pos(LeafEvent::Started(CompileScripts)));
}

#[tokio::test]
async fn deploy_cleans_twice_and_publishes_between() {
    init_tracing();

    let runner = RecordingRunner::new();
    let report = with_timeout(run_task_tree(&deploy_task(), Arc::new(runner.clone())))
        .await
        .unwrap();
    assert!(report.is_success());
    assert!(report.succeeded.contains(&"clean#2".to_string()));

    let started = runner.started();
    assert_eq!(started.iter().filter(|l| **l == Clean).count(), 2);
    assert_eq!(started.last(), Some(&Clean));
    assert_eq!(started[started.len() - 2], Publish);
}

#[tokio::test]
async fn failed_build_never_publishes() {
    init_tracing();

    let runner = RecordingRunner::new().failing(CompileScripts);
    let report = with_timeout(run_task_tree(&deploy_task(), Arc::new(runner.clone())))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert!(!runner.started().contains(&Publish));
    assert_eq!(
        report.skipped,
        vec!["publish".to_string(), "clean#2".to_string()]
    );
}

#[tokio::test]
async fn single_leaf_pipeline_runs_once() {
    init_tracing();

    let runner = RecordingRunner::new();
    let report = with_timeout(run_task_tree(&Task::leaf(Clean), Arc::new(runner.clone())))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(runner.started(), vec![Clean]);
}
