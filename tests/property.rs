// tests/property.rs
mod common;
use crate::common::builders::{command_task, fields, task_out, wf_input};
use crate::common::RecordingBackend;

use std::collections::{BTreeSet, HashMap};

use flowrun::engine::{Scheduler, WorkflowRunner};
use flowrun::errors::{FlowError, TaskFailure};
use flowrun::types::FieldValues;
use flowrun::workflow::{InputSource, TaskSpec, Workflow, WorkflowBuilder};
use proptest::prelude::*;
use serde_json::{json, Value};

fn task_name(i: usize) -> String {
    format!("task_{i}")
}

/// Build a workflow from per-task dependency lists. Task `i` reads `out`
/// from each task in `deps[i]`; tasks with no deps read workflow input `x`.
/// Every task is exposed as a workflow output.
fn workflow_from_deps(deps: &[BTreeSet<usize>]) -> Workflow {
    let mut builder = WorkflowBuilder::new("generated").input("x");
    for (i, task_deps) in deps.iter().enumerate() {
        let inputs: Vec<(String, InputSource)> = if task_deps.is_empty() {
            vec![("x".to_string(), wf_input("x"))]
        } else {
            task_deps
                .iter()
                .map(|d| (format!("in_{d}"), task_out(&task_name(*d), "out")))
                .collect()
        };
        let borrowed: Vec<(&str, InputSource)> = inputs
            .iter()
            .map(|(f, s)| (f.as_str(), s.clone()))
            .collect();
        builder = builder
            .task(command_task(&task_name(i), &borrowed, &["out"]))
            .output(format!("result_{i}"), task_out(&task_name(i), "out"));
    }
    builder.build().expect("generated workflow is valid")
}

// Acyclicity by construction: task i may only depend on tasks 0..i.
fn acyclic_deps_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential.into_iter().map(|d| d % i).collect()
                    }
                })
                .collect()
        })
    })
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("building test runtime")
        .block_on(f)
}

fn fake_exec(task: &TaskSpec, _inputs: &FieldValues) -> Result<FieldValues, TaskFailure> {
    Ok(task
        .outputs
        .iter()
        .map(|f| (f.clone(), Value::String(format!("{}.{f}", task.name))))
        .collect())
}

proptest! {
    #[test]
    fn acyclic_workflows_always_finish(deps in acyclic_deps_strategy(12)) {
        let workflow = workflow_from_deps(&deps);
        let mut runner = WorkflowRunner::with_backend(
            workflow,
            RecordingBackend::new(),
            fields([("x", json!(1))]),
        ).unwrap();

        let outputs = block_on(runner.run()).unwrap();

        prop_assert_eq!(outputs.len(), deps.len());
        for (i, task_deps) in deps.iter().enumerate() {
            let runner_state = runner.task(&task_name(i)).unwrap();
            prop_assert!(runner_state.finished());
            prop_assert_eq!(&outputs[&format!("result_{i}")], &json!(format!("task_{i}.out")));

            // A task finishes strictly after everything it reads from.
            let round = runner_state.finished_round().unwrap();
            for d in task_deps {
                let upstream = runner.task(&task_name(*d)).unwrap().finished_round().unwrap();
                prop_assert!(upstream < round);
            }
        }
    }

    #[test]
    fn cycles_always_deadlock(
        deps in acyclic_deps_strategy(8),
        cycle_len in 1usize..4,
    ) {
        // Append a ring of `cycle_len` tasks, each reading the next one; the
        // first also reads an existing task so the ring hangs off the DAG.
        let base = deps.len();
        let mut all = deps.clone();
        for k in 0..cycle_len {
            let next = base + (k + 1) % cycle_len;
            let mut d = BTreeSet::from([next]);
            if k == 0 {
                d.insert(base - 1);
            }
            all.push(d);
        }

        let workflow = workflow_from_deps(&all);
        let mut runner = WorkflowRunner::with_backend(
            workflow,
            RecordingBackend::new(),
            fields([("x", json!(1))]),
        ).unwrap();

        match block_on(runner.run()) {
            Err(FlowError::Deadlock { unfinished }) => {
                for k in 0..cycle_len {
                    let name = task_name(base + k);
                    prop_assert!(unfinished.contains(&name));
                    prop_assert!(!runner.task(&name).unwrap().finished());
                }
                for i in 0..base {
                    prop_assert!(runner.task(&task_name(i)).unwrap().finished());
                }
            }
            other => prop_assert!(false, "expected Deadlock, got {:?}", other),
        }
        prop_assert!(runner.outputs().is_none());
    }

    #[test]
    fn connections_and_completion_are_monotonic(deps in acyclic_deps_strategy(10)) {
        let workflow = workflow_from_deps(&deps);
        let mut scheduler = Scheduler::new(&workflow, fields([("x", json!(1))]));

        let mut seen: HashMap<String, (FieldValues, bool)> = HashMap::new();
        for _ in 0..=deps.len() {
            scheduler.step_with(fake_exec).unwrap();

            for runner in scheduler.tasks() {
                if let Some((prev_connected, prev_finished)) = seen.get(runner.name()) {
                    for (field, value) in prev_connected {
                        prop_assert_eq!(runner.connected().get(field), Some(value));
                    }
                    prop_assert!(!prev_finished || runner.finished());
                }
                seen.insert(
                    runner.name().clone(),
                    (runner.connected().clone(), runner.finished()),
                );
            }
        }
        prop_assert!(scheduler.all_finished());
    }

    #[test]
    fn inputs_must_match_declared_fields_exactly(
        declared in proptest::collection::btree_set("[a-z]{1,6}", 1..5),
        extra in "[A-Z]{1,6}",
        drop_index in any::<usize>(),
    ) {
        let mut builder = WorkflowBuilder::new("inputs");
        for field in &declared {
            builder = builder.input(field.clone());
        }
        let workflow = builder
            .task(TaskSpec::command("t", "true"))
            .build()
            .unwrap();

        let exact: FieldValues = declared.iter().map(|f| (f.clone(), json!(0))).collect();
        prop_assert!(WorkflowRunner::new(workflow.clone(), exact.clone()).is_ok());

        let mut with_extra = exact.clone();
        with_extra.insert(extra.clone(), json!(0));
        match WorkflowRunner::new(workflow.clone(), with_extra) {
            Err(FlowError::InvalidInput { missing, extra: got }) => {
                prop_assert!(missing.is_empty());
                prop_assert_eq!(got, vec![extra.clone()]);
            }
            other => prop_assert!(false, "expected InvalidInput, got {:?}", other.map(|_| ())),
        }

        let dropped = declared.iter().nth(drop_index % declared.len()).unwrap().clone();
        let mut without = exact;
        without.shift_remove(&dropped);
        match WorkflowRunner::new(workflow, without) {
            Err(err @ FlowError::InvalidInput { .. }) => {
                prop_assert!(err.to_string().contains(&dropped));
            }
            other => prop_assert!(false, "expected InvalidInput, got {:?}", other.map(|_| ())),
        }
    }
}
