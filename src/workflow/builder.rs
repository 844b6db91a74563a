// src/workflow/builder.rs

//! Construction and validation of [`Workflow`]s.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::{FlowError, Result};
use crate::types::TaskName;
use crate::workflow::model::Workflow;
use crate::workflow::source::{InputSource, WORKFLOW_INPUT_PREFIX};
use crate::workflow::task::TaskSpec;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("valid name regex"));

/// Incrementally describes a workflow; [`build`](Self::build) validates it.
///
/// ```
/// use flowrun::workflow::{InputSource, TaskSpec, WorkflowBuilder};
///
/// let workflow = WorkflowBuilder::new("doubler")
///     .input("x")
///     .task(
///         TaskSpec::command("T1", "jq '{y: (.x * 2)}'")
///             .input("x", InputSource::workflow_input("x"))
///             .output("y"),
///     )
///     .output("z", InputSource::task_output("T1", "y"))
///     .build()
///     .unwrap();
///
/// assert_eq!(workflow.task_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    name: String,
    input_fields: BTreeSet<String>,
    tasks: Vec<TaskSpec>,
    outputs: Vec<(String, InputSource)>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_fields: BTreeSet::new(),
            tasks: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Declare a workflow input field.
    pub fn input(mut self, field: impl Into<String>) -> Self {
        self.input_fields.insert(field.into());
        self
    }

    pub fn task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }

    /// Bind a workflow output field to a source.
    pub fn output(mut self, field: impl Into<String>, source: InputSource) -> Self {
        self.outputs.push((field.into(), source));
        self
    }

    pub fn build(self) -> Result<Workflow> {
        ensure_has_tasks(&self)?;
        validate_names(&self)?;
        let tasks = index_tasks(self.tasks)?;
        let outputs = index_outputs(self.outputs)?;
        validate_references(&self.input_fields, &tasks, &outputs)?;

        debug!(
            workflow = %self.name,
            tasks = tasks.len(),
            inputs = self.input_fields.len(),
            outputs = outputs.len(),
            "workflow validated"
        );

        Ok(Workflow::new_unchecked(
            self.name,
            self.input_fields,
            tasks,
            outputs,
        ))
    }
}

fn invalid(msg: String) -> FlowError {
    FlowError::InvalidWorkflow(msg)
}

fn ensure_has_tasks(b: &WorkflowBuilder) -> Result<()> {
    if b.tasks.is_empty() {
        return Err(invalid(format!(
            "workflow '{}' must contain at least one task",
            b.name
        )));
    }
    Ok(())
}

fn check_name(kind: &str, name: &str) -> Result<()> {
    if !NAME_RE.is_match(name) {
        return Err(invalid(format!(
            "{kind} name '{name}' is not valid (use letters, digits, '_' or '-', not starting with a digit)"
        )));
    }
    Ok(())
}

fn validate_names(b: &WorkflowBuilder) -> Result<()> {
    for field in &b.input_fields {
        check_name("workflow input", field)?;
    }

    for task in &b.tasks {
        check_name("task", &task.name)?;
        if task.name == WORKFLOW_INPUT_PREFIX {
            return Err(invalid(format!(
                "task name '{WORKFLOW_INPUT_PREFIX}' is reserved for workflow inputs"
            )));
        }
        for field in task.inputs.keys() {
            check_name(&format!("task '{}' input field", task.name), field)?;
        }
        for field in &task.outputs {
            check_name(&format!("task '{}' output field", task.name), field)?;
        }
    }

    for (field, _) in &b.outputs {
        check_name("workflow output", field)?;
    }

    Ok(())
}

fn index_tasks(tasks: Vec<TaskSpec>) -> Result<IndexMap<TaskName, TaskSpec>> {
    let mut indexed = IndexMap::with_capacity(tasks.len());
    for task in tasks {
        if indexed.contains_key(&task.name) {
            return Err(invalid(format!("duplicate task name '{}'", task.name)));
        }
        indexed.insert(task.name.clone(), task);
    }
    Ok(indexed)
}

fn index_outputs(outputs: Vec<(String, InputSource)>) -> Result<IndexMap<String, InputSource>> {
    let mut indexed = IndexMap::with_capacity(outputs.len());
    for (field, source) in outputs {
        if indexed.contains_key(&field) {
            return Err(invalid(format!("duplicate workflow output field '{field}'")));
        }
        indexed.insert(field, source);
    }
    Ok(indexed)
}

/// Every source must point at a declared workflow input or a declared output
/// field of an existing task. Cycles are allowed here; they surface as a
/// deadlock at run time.
fn validate_references(
    input_fields: &BTreeSet<String>,
    tasks: &IndexMap<TaskName, TaskSpec>,
    outputs: &IndexMap<String, InputSource>,
) -> Result<()> {
    let check = |owner: &str, source: &InputSource| -> Result<()> {
        match source {
            InputSource::WorkflowInput { name } => {
                if !input_fields.contains(name) {
                    return Err(invalid(format!(
                        "{owner} references undeclared workflow input '{name}'"
                    )));
                }
            }
            InputSource::TaskOutput { task, field } => match tasks.get(task) {
                None => {
                    return Err(invalid(format!(
                        "{owner} references unknown task '{task}'"
                    )));
                }
                Some(spec) if !spec.outputs.contains(field) => {
                    return Err(invalid(format!(
                        "{owner} references output '{field}' which task '{task}' does not declare"
                    )));
                }
                Some(_) => {}
            },
        }
        Ok(())
    };

    for task in tasks.values() {
        for (field, source) in &task.inputs {
            check(&format!("input '{field}' of task '{}'", task.name), source)?;
        }
    }

    for (field, source) in outputs {
        check(&format!("workflow output '{field}'"), source)?;
    }

    Ok(())
}
