// tests/scheduler_steps.rs
mod common;
use crate::common::builders::{command_task, fields, task_out, wf_input};
use crate::common::init_tracing;

use std::error::Error;

use flowrun::engine::{RoundStep, Scheduler};
use flowrun::errors::{FlowError, TaskFailure};
use flowrun::types::FieldValues;
use flowrun::workflow::{ExecutionPlan, TaskSpec, Workflow, WorkflowBuilder};
use serde_json::{json, Value};

type TestResult = Result<(), Box<dyn Error>>;

/// Diamond: A -> (B, C) -> D, plus an independent E.
fn diamond() -> Workflow {
    WorkflowBuilder::new("diamond")
        .input("x")
        .task(command_task("A", &[("x", wf_input("x"))], &["out"]))
        .task(command_task("B", &[("in", task_out("A", "out"))], &["out"]))
        .task(command_task("C", &[("in", task_out("A", "out"))], &["out"]))
        .task(command_task(
            "D",
            &[("left", task_out("B", "out")), ("right", task_out("C", "out"))],
            &["out"],
        ))
        .task(command_task("E", &[], &["out"]))
        .output("result", task_out("D", "out"))
        .build()
        .expect("diamond workflow is valid")
}

/// Outputs each declared field as `"<task>.<field>"`.
fn fake_exec(task: &TaskSpec, _inputs: &FieldValues) -> Result<FieldValues, TaskFailure> {
    Ok(task
        .outputs
        .iter()
        .map(|f| (f.clone(), Value::String(format!("{}.{f}", task.name))))
        .collect())
}

#[test]
fn diamond_runs_level_by_level() -> TestResult {
    init_tracing();

    let workflow = diamond();
    let mut scheduler = Scheduler::new(&workflow, fields([("x", json!(1))]));

    let step = scheduler.step_with(fake_exec)?;
    assert_eq!(
        step,
        RoundStep {
            round: 1,
            connected_fields: 1,
            ready: vec!["A".into(), "E".into()],
            finished: vec!["A".into(), "E".into()],
            all_finished: false,
        }
    );

    let step = scheduler.step_with(fake_exec)?;
    assert_eq!(step.connected_fields, 2);
    assert_eq!(step.finished, vec!["B", "C"]);

    let step = scheduler.step_with(fake_exec)?;
    assert_eq!(step.connected_fields, 2);
    assert_eq!(step.finished, vec!["D"]);
    assert!(step.all_finished);

    let d = scheduler.task("D").unwrap();
    assert_eq!(d.inputs()?.get("left"), Some(&json!("B.out")));
    assert_eq!(d.inputs()?.get("right"), Some(&json!("C.out")));

    // A further round has nothing left to do.
    let step = scheduler.step_with(fake_exec)?;
    assert!(!step.made_progress());
    Ok(())
}

#[test]
fn plan_levels_match_scheduler_rounds() -> TestResult {
    init_tracing();

    let workflow = diamond();
    let plan = ExecutionPlan::from_workflow(&workflow);
    assert_eq!(
        plan.levels,
        vec![
            vec!["A".to_string(), "E".to_string()],
            vec!["B".to_string(), "C".to_string()],
            vec!["D".to_string()],
        ]
    );

    let mut scheduler = Scheduler::new(&workflow, fields([("x", json!(1))]));
    while !scheduler.all_finished() {
        scheduler.step_with(fake_exec)?;
    }

    for (level, names) in plan.levels.iter().enumerate() {
        for name in names {
            let round = scheduler.task(name).unwrap().finished_round();
            assert_eq!(round, Some(level as u64 + 1), "task {name}");
        }
    }
    Ok(())
}

#[test]
fn connected_fields_are_never_overwritten() -> TestResult {
    init_tracing();

    let workflow = diamond();
    let mut scheduler = Scheduler::new(&workflow, fields([("x", json!(1))]));
    scheduler.begin_round()?;

    let mut runner = scheduler.task("A").unwrap().clone();
    assert!(!runner.connect_input("x", json!(999))?);
    assert_eq!(runner.connected().get("x"), Some(&json!(1)));

    assert!(matches!(
        runner.connect_input("nope", json!(0)),
        Err(FlowError::UnknownInputField { .. })
    ));
    Ok(())
}

#[test]
fn finished_flag_is_set_exactly_once() -> TestResult {
    init_tracing();

    let workflow = diamond();
    let mut scheduler = Scheduler::new(&workflow, fields([("x", json!(1))]));

    // B is not connected yet.
    assert!(matches!(
        scheduler.complete_task("B", FieldValues::new()),
        Err(FlowError::InputsNotConnected(_))
    ));

    scheduler.begin_round()?;
    scheduler.complete_task("A", fields([("out", json!(1))]))?;
    assert!(matches!(
        scheduler.complete_task("A", fields([("out", json!(2))])),
        Err(FlowError::TaskAlreadyFinished(_))
    ));

    let a = scheduler.task("A").unwrap();
    assert!(a.finished());
    assert_eq!(a.output("out"), Some(&json!(1)));

    assert!(matches!(
        scheduler.complete_task("nope", FieldValues::new()),
        Err(FlowError::TaskNotFound(_))
    ));
    Ok(())
}

#[test]
fn failure_in_step_stops_the_round() -> TestResult {
    init_tracing();

    let workflow = diamond();
    let mut scheduler = Scheduler::new(&workflow, fields([("x", json!(1))]));

    let err = scheduler
        .step_with(|task, inputs| {
            if task.name == "A" {
                Err(TaskFailure::new("nope").with_exit_code(3))
            } else {
                fake_exec(task, inputs)
            }
        })
        .unwrap_err();

    match err {
        FlowError::TaskFailed { task, failure } => {
            assert_eq!(task, "A");
            assert_eq!(failure.exit_code, Some(3));
            assert_eq!(failure.to_string(), "nope (exit code 3)");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    // A failed first, so E (later in declaration order) never ran.
    assert!(!scheduler.task("A").unwrap().finished());
    assert!(!scheduler.task("E").unwrap().finished());
    Ok(())
}
