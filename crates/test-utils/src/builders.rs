// crates/test-utils/src/builders.rs

#![allow(dead_code)]

use anyhow::anyhow;
use flowrun::types::FieldValues;
use flowrun::workflow::{InputSource, TaskSpec, Workflow, WorkflowBuilder};
use serde_json::{Value, json};

/// Build a `FieldValues` map from `(name, value)` pairs.
pub fn fields<I, K>(pairs: I) -> FieldValues
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

pub fn wf_input(name: &str) -> InputSource {
    InputSource::workflow_input(name)
}

pub fn task_out(task: &str, field: &str) -> InputSource {
    InputSource::task_output(task, field)
}

/// A function task that reads input `input` as a number and outputs it
/// doubled as `output`.
pub fn doubling_task(name: &str, input: &str, source: InputSource, output: &str) -> TaskSpec {
    let input_field = input.to_string();
    let output_field = output.to_string();
    TaskSpec::function(name, move |inputs| {
        let x = inputs
            .get(&input_field)
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("input '{input_field}' is not an integer"))?;
        Ok(fields([(output_field.clone(), json!(x * 2))]))
    })
    .input(input, source)
    .output(output)
}

/// A function task that always fails with `message`.
pub fn failing_task(name: &str, message: &'static str) -> TaskSpec {
    TaskSpec::function(name, move |_| Err(anyhow!(message)))
}

/// A command task with the given bindings and outputs. Only meaningful
/// with a backend that does not spawn processes (`RecordingBackend`).
pub fn command_task(name: &str, inputs: &[(&str, InputSource)], outputs: &[&str]) -> TaskSpec {
    let mut spec = TaskSpec::command(name, format!("echo {name}"));
    for (field, source) in inputs {
        spec = spec.input(*field, source.clone());
    }
    for field in outputs {
        spec = spec.output(*field);
    }
    spec
}

/// Scenario A: inputs `{x}`, `T1` computes `y = x * 2`, output `z = T1.y`.
pub fn doubler_workflow() -> Workflow {
    WorkflowBuilder::new("doubler")
        .input("x")
        .task(doubling_task("T1", "x", wf_input("x"), "y"))
        .output("z", task_out("T1", "y"))
        .build()
        .expect("Failed to build doubler workflow")
}

/// Linear chain `T1 -> T2 -> ... -> Tn`, each doubling its input; output
/// `result` is the last task's `y`.
pub fn chain_workflow(len: usize) -> Workflow {
    assert!(len >= 1, "chain needs at least one task");
    let mut builder = WorkflowBuilder::new("chain").input("x");
    for i in 1..=len {
        let source = if i == 1 {
            wf_input("x")
        } else {
            task_out(&format!("T{}", i - 1), "y")
        };
        builder = builder.task(doubling_task(&format!("T{i}"), "x", source, "y"));
    }
    builder
        .output("result", task_out(&format!("T{len}"), "y"))
        .build()
        .expect("Failed to build chain workflow")
}
