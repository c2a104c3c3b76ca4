// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use sitepipe::dag::Scheduler;
use sitepipe::engine::{CoreCommand, CoreRuntime, Runtime, RuntimeEvent, TaskOutcome};
use sitepipe::task::entry::build_task;
use sitepipe::task::{LeafKind, Task};
use sitepipe_test_utils::fake_executor::FakeExecutor;
use sitepipe_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

/// Very simple chain: clean -> markup
fn simple_chain() -> Task {
    Task::sequential(
        "chain",
        vec![Task::leaf(LeafKind::Clean), Task::leaf(LeafKind::CompileMarkup)],
    )
}

#[tokio::test]
async fn runtime_runs_chain_in_order_with_fake_executor() -> TestResult {
    init_tracing();

    let scheduler = Scheduler::from_task(&simple_chain())?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx.clone(), Arc::clone(&executed));

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(2), runtime.run()).await??;

    assert!(report.is_success());
    assert_eq!(
        *executed.lock().unwrap(),
        vec!["clean".to_string(), "markup".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn runtime_reports_failure_and_skips_dependents() -> TestResult {
    init_tracing();

    let scheduler = Scheduler::from_task(&build_task())?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx.clone(), Arc::clone(&executed)).failing("images");

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, executor);
    let report = timeout(Duration::from_secs(2), runtime.run()).await??;

    assert_eq!(report.succeeded, vec!["clean".to_string()]);
    assert_eq!(report.failed, vec![("images".to_string(), "fake failure".to_string())]);
    assert_eq!(
        report.skipped,
        vec!["markup".to_string(), "styles".to_string(), "scripts".to_string()]
    );
    assert_eq!(
        *executed.lock().unwrap(),
        vec!["clean".to_string(), "images".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn shutdown_leaves_running_tasks_unfinished() -> TestResult {
    init_tracing();

    // An executor that never completes anything.
    struct Silent;
    impl sitepipe::exec::ExecutorBackend for Silent {
        fn spawn_ready_tasks(
            &mut self,
            _tasks: Vec<sitepipe::dag::ScheduledTask>,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = sitepipe::errors::Result<()>> + Send + '_>,
        > {
            Box::pin(async { Ok(()) })
        }
    }

    let scheduler = Scheduler::from_task(&simple_chain())?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    let runtime = Runtime::new(CoreRuntime::new(scheduler), rt_rx, Silent);
    let report = timeout(Duration::from_secs(2), runtime.run()).await??;

    assert!(!report.is_success());
    assert_eq!(
        report.unfinished,
        vec!["clean".to_string(), "markup".to_string()]
    );
    Ok(())
}

#[test]
fn core_step_requests_exit_when_run_finishes() {
    let scheduler = Scheduler::from_task(&Task::leaf(LeafKind::Clean)).unwrap();
    let mut core = CoreRuntime::new(scheduler);

    let start = core.start();
    assert!(start.keep_running);
    assert!(matches!(
        start.commands.as_slice(),
        [CoreCommand::DispatchTasks(tasks)] if tasks.len() == 1
    ));

    let step = core.step(RuntimeEvent::TaskCompleted {
        task: "clean".to_string(),
        outcome: TaskOutcome::Success,
    });
    assert!(!step.keep_running);
    assert!(step
        .commands
        .iter()
        .any(|c| matches!(c, CoreCommand::RequestExit)));
    assert!(core.is_idle());
}
