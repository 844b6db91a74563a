// src/workflow/task.rs

//! Static description of a single task.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;

use crate::types::{FieldValues, TaskName};
use crate::workflow::source::InputSource;

type TaskCallable = dyn Fn(&FieldValues) -> anyhow::Result<FieldValues> + Send + Sync;

/// An in-process task computation.
///
/// Receives the task's connected inputs and returns its outputs.
#[derive(Clone)]
pub struct TaskFn(Arc<TaskCallable>);

impl TaskFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FieldValues) -> anyhow::Result<FieldValues> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, inputs: &FieldValues) -> anyhow::Result<FieldValues> {
        (self.0)(inputs)
    }
}

impl fmt::Debug for TaskFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TaskFn(..)")
    }
}

/// What a task actually does when executed.
///
/// Which variants a backend can handle is up to the backend: the local
/// backend calls functions, the process backend runs commands.
#[derive(Debug, Clone)]
pub enum TaskAction {
    Function(TaskFn),
    Command(String),
}

impl TaskAction {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskAction::Function(_) => "function",
            TaskAction::Command(_) => "command",
        }
    }
}

/// Static description of one task: its input bindings, declared outputs and
/// action.
///
/// Input field names are unique within a task (binding the same field twice
/// keeps the last binding).
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: TaskName,
    pub inputs: IndexMap<String, InputSource>,
    pub outputs: BTreeSet<String>,
    pub action: TaskAction,
    /// Upper bound on execution time, for backends that enforce one.
    pub timeout: Option<Duration>,
}

impl TaskSpec {
    pub fn new(name: impl Into<TaskName>, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            inputs: IndexMap::new(),
            outputs: BTreeSet::new(),
            action,
            timeout: None,
        }
    }

    /// A task backed by an in-process function.
    pub fn function<F>(name: impl Into<TaskName>, f: F) -> Self
    where
        F: Fn(&FieldValues) -> anyhow::Result<FieldValues> + Send + Sync + 'static,
    {
        Self::new(name, TaskAction::Function(TaskFn::new(f)))
    }

    /// A task backed by a shell command.
    pub fn command(name: impl Into<TaskName>, cmd: impl Into<String>) -> Self {
        Self::new(name, TaskAction::Command(cmd.into()))
    }

    pub fn input(mut self, field: impl Into<String>, source: InputSource) -> Self {
        self.inputs.insert(field.into(), source);
        self
    }

    pub fn output(mut self, field: impl Into<String>) -> Self {
        self.outputs.insert(field.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Names of the tasks this task reads outputs from (deduplicated).
    pub fn upstream_tasks(&self) -> BTreeSet<&str> {
        self.inputs
            .values()
            .filter_map(InputSource::upstream_task)
            .collect()
    }
}
