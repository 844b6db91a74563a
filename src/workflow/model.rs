// src/workflow/model.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::types::TaskName;
use crate::workflow::source::InputSource;
use crate::workflow::task::TaskSpec;

/// A validated, immutable workflow.
///
/// Only constructed through [`WorkflowBuilder`](crate::workflow::WorkflowBuilder)
/// (or the workflow-file loader, which goes through the builder), so every
/// `InputSource` it contains references a declared workflow input or a
/// declared output of an existing task.
///
/// Cloning is cheap; the same workflow can back any number of runs.
#[derive(Debug, Clone)]
pub struct Workflow {
    inner: Arc<WorkflowInner>,
}

#[derive(Debug)]
struct WorkflowInner {
    name: String,
    input_fields: BTreeSet<String>,
    tasks: IndexMap<TaskName, TaskSpec>,
    output_fields: IndexMap<String, InputSource>,
}

impl Workflow {
    /// Construct without validation. Callers must uphold the reference
    /// invariant.
    pub(crate) fn new_unchecked(
        name: String,
        input_fields: BTreeSet<String>,
        tasks: IndexMap<TaskName, TaskSpec>,
        output_fields: IndexMap<String, InputSource>,
    ) -> Self {
        Self {
            inner: Arc::new(WorkflowInner {
                name,
                input_fields,
                tasks,
                output_fields,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared workflow input field names.
    pub fn input_fields(&self) -> &BTreeSet<String> {
        &self.inner.input_fields
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskSpec> {
        self.inner.tasks.values()
    }

    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.inner.tasks.get(name)
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.inner.tasks.keys().map(String::as_str)
    }

    pub fn task_count(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Workflow output field → source bindings.
    pub fn output_fields(&self) -> &IndexMap<String, InputSource> {
        &self.inner.output_fields
    }
}
