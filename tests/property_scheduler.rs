// tests/property_scheduler.rs

use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;
use sitepipe::dag::{Scheduler, TaskRunState};
use sitepipe::engine::TaskOutcome;
use sitepipe::task::{LeafKind, Task};

fn leaf_strategy() -> impl Strategy<Value = Task> {
    proptest::sample::select(LeafKind::ALL.to_vec()).prop_map(Task::leaf)
}

// Random trees of nested sequential / parallel composites.
fn task_strategy() -> impl Strategy<Value = Task> {
    leaf_strategy().prop_recursive(4, 32, 4, |inner| {
        (any::<bool>(), proptest::collection::vec(inner, 1..4)).prop_map(
            |(parallel, children)| {
                if parallel {
                    Task::parallel("par", children)
                } else {
                    Task::sequential("seq", children)
                }
            },
        )
    })
}

proptest! {
    #[test]
    fn every_run_terminates_and_respects_dependencies(
        task in task_strategy(),
        failing in proptest::collection::hash_set(
            proptest::sample::select(LeafKind::ALL.to_vec()),
            0..3,
        ),
        pick_back in proptest::collection::vec(any::<bool>(), 64),
    ) {
        let mut scheduler = Scheduler::from_task(&task).unwrap();
        let mut executing: VecDeque<_> = scheduler.start_new_run().newly_scheduled.into();
        let mut completed: HashSet<String> = HashSet::new();
        let mut steps = 0;

        while !executing.is_empty() {
            // Vary completion order to explore interleavings.
            let next = if pick_back[steps % pick_back.len()] {
                executing.pop_back()
            } else {
                executing.pop_front()
            };
            let Some(current) = next else { break };
            steps += 1;

            for dep in scheduler.graph().dependencies_of(&current.name) {
                prop_assert_eq!(
                    scheduler.run_state_of(dep),
                    Some(TaskRunState::DoneSuccess),
                    "{} ran before its dependency {} succeeded",
                    current.name,
                    dep
                );
            }

            let outcome = if failing.contains(&current.leaf) {
                TaskOutcome::Failed("boom".to_string())
            } else {
                TaskOutcome::Success
            };
            prop_assert!(completed.insert(current.name.clone()), "{} ran twice", current.name);
            executing.extend(scheduler.handle_completion(&current.name, outcome));
        }

        prop_assert!(scheduler.is_idle());
        let report = scheduler.report();
        prop_assert!(report.unfinished.is_empty());

        let names: Vec<String> = scheduler.task_names().map(str::to_string).collect();
        for name in &names {
            let deps_ok = scheduler
                .graph()
                .dependencies_of(name)
                .iter()
                .all(|d| scheduler.run_state_of(d) == Some(TaskRunState::DoneSuccess));
            match scheduler.run_state_of(name) {
                Some(TaskRunState::Skipped) => prop_assert!(!deps_ok),
                Some(TaskRunState::DoneSuccess) | Some(TaskRunState::DoneFailed) => {
                    prop_assert!(deps_ok);
                    prop_assert!(completed.contains(name));
                }
                other => prop_assert!(false, "{} ended in {:?}", name, other),
            }
        }

        prop_assert_eq!(report.is_success(), completed.len() == names.len()
            && report.failed.is_empty());
    }
}
