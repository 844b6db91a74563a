// tests/input_validation.rs
mod common;
use crate::common::builders::{doubling_task, fields, task_out, wf_input};
use crate::common::init_tracing;

use flowrun::engine::WorkflowRunner;
use flowrun::errors::FlowError;
use flowrun::types::FieldValues;
use flowrun::workflow::{Workflow, WorkflowBuilder};
use serde_json::json;

fn two_inputs() -> Workflow {
    WorkflowBuilder::new("two-inputs")
        .input("a")
        .input("b")
        .task(doubling_task("T1", "x", wf_input("a"), "y"))
        .task(doubling_task("T2", "x", wf_input("b"), "y"))
        .output("ya", task_out("T1", "y"))
        .output("yb", task_out("T2", "y"))
        .build()
        .expect("valid workflow")
}

#[test]
fn exact_inputs_are_accepted() {
    init_tracing();
    let inputs = fields([("a", json!(1)), ("b", json!(2))]);
    assert!(WorkflowRunner::new(two_inputs(), inputs).is_ok());
}

#[test]
fn missing_input_is_named() {
    init_tracing();
    let err = WorkflowRunner::new(two_inputs(), fields([("a", json!(1))])).unwrap_err();

    match &err {
        FlowError::InvalidInput { missing, extra } => {
            assert_eq!(missing, &vec!["b".to_string()]);
            assert!(extra.is_empty());
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(err.to_string().contains("need to be specified: b"));
}

#[test]
fn extra_input_is_named() {
    init_tracing();
    let inputs = fields([("a", json!(1)), ("b", json!(2)), ("zzz", json!(3))]);
    let err = WorkflowRunner::new(two_inputs(), inputs).unwrap_err();

    match &err {
        FlowError::InvalidInput { missing, extra } => {
            assert!(missing.is_empty());
            assert_eq!(extra, &vec!["zzz".to_string()]);
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert!(err.to_string().contains("not recognized: zzz"));
}

#[test]
fn missing_and_extra_are_both_listed_comma_joined() {
    init_tracing();
    let inputs = fields([("c", json!(1)), ("d", json!(2))]);
    let err = WorkflowRunner::new(two_inputs(), inputs).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("need to be specified: a,b"), "message was: {msg}");
    assert!(msg.contains("not recognized: c,d"), "message was: {msg}");
}

#[test]
fn workflow_without_inputs_rejects_any_input() {
    init_tracing();
    let workflow = WorkflowBuilder::new("none")
        .task(doubling_task("T1", "x", task_out("T0", "y"), "y"))
        .task(doubling_task("T0", "x", task_out("T1", "y"), "y"))
        .build()
        .expect("cycles are allowed at construction");

    assert!(WorkflowRunner::new(workflow.clone(), FieldValues::new()).is_ok());
    assert!(matches!(
        WorkflowRunner::new(workflow, fields([("x", json!(1))])),
        Err(FlowError::InvalidInput { .. })
    ));
}
