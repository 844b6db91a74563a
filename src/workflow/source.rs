// src/workflow/source.rs

//! References from a task input (or a workflow output) to the value that
//! feeds it.

use std::fmt;
use std::str::FromStr;

use crate::errors::{FlowError, Result};
use crate::types::Value;

/// Prefix used in the textual form of a workflow input reference.
pub const WORKFLOW_INPUT_PREFIX: &str = "input";

/// Where a field's value comes from.
///
/// Textual form (used in workflow files and logs):
/// - `input.<name>` for a workflow-level input
/// - `<task>.<field>` for another task's output field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputSource {
    WorkflowInput { name: String },
    TaskOutput { task: String, field: String },
}

/// Read-only view of a run's state that sources resolve against.
///
/// Implemented by the scheduler. Lookups must not have side effects.
pub trait SourceState {
    /// A validated workflow input, if supplied.
    fn workflow_input(&self, name: &str) -> Option<&Value>;

    /// Whether the named task has finished in this run.
    fn task_finished(&self, task: &str) -> bool;

    /// A recorded output of a finished task.
    fn task_output(&self, task: &str, field: &str) -> Option<&Value>;
}

impl InputSource {
    pub fn workflow_input(name: impl Into<String>) -> Self {
        InputSource::WorkflowInput { name: name.into() }
    }

    pub fn task_output(task: impl Into<String>, field: impl Into<String>) -> Self {
        InputSource::TaskOutput {
            task: task.into(),
            field: field.into(),
        }
    }

    /// The task this source depends on, if any.
    pub fn upstream_task(&self) -> Option<&str> {
        match self {
            InputSource::WorkflowInput { .. } => None,
            InputSource::TaskOutput { task, .. } => Some(task),
        }
    }

    /// Whether the referenced value exists in `state`.
    pub fn ready(&self, state: &impl SourceState) -> bool {
        match self {
            InputSource::WorkflowInput { name } => state.workflow_input(name).is_some(),
            InputSource::TaskOutput { task, .. } => state.task_finished(task),
        }
    }

    /// Fetch the referenced value from `state`.
    ///
    /// Fails if the source is not ready yet, or if the upstream task finished
    /// without producing the referenced field.
    pub fn get_value(&self, state: &impl SourceState) -> Result<Value> {
        match self {
            InputSource::WorkflowInput { name } => state
                .workflow_input(name)
                .cloned()
                .ok_or_else(|| FlowError::SourceNotReady(self.to_string())),
            InputSource::TaskOutput { task, field } => {
                if !state.task_finished(task) {
                    return Err(FlowError::SourceNotReady(self.to_string()));
                }
                state
                    .task_output(task, field)
                    .cloned()
                    .ok_or_else(|| FlowError::MissingOutput {
                        task: task.clone(),
                        field: field.clone(),
                    })
            }
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::WorkflowInput { name } => write!(f, "{WORKFLOW_INPUT_PREFIX}.{name}"),
            InputSource::TaskOutput { task, field } => write!(f, "{task}.{field}"),
        }
    }
}

impl FromStr for InputSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (head, field) = s.split_once('.').ok_or_else(|| {
            format!("invalid input source '{s}' (expected \"input.<name>\" or \"<task>.<field>\")")
        })?;

        if head.is_empty() || field.is_empty() || field.contains('.') {
            return Err(format!(
                "invalid input source '{s}' (expected \"input.<name>\" or \"<task>.<field>\")"
            ));
        }

        if head == WORKFLOW_INPUT_PREFIX {
            Ok(InputSource::workflow_input(field))
        } else {
            Ok(InputSource::task_output(head, field))
        }
    }
}
