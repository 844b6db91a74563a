// crates/test-utils/src/fake_backend.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use flowrun::errors::TaskFailure;
use flowrun::exec::{ExecFuture, ExecutionBackend, LocalBackend};
use flowrun::types::FieldValues;
use flowrun::workflow::{TaskAction, TaskSpec};
use serde_json::Value;
use tracing::debug;

/// A fake backend that:
/// - records which tasks were executed, in order
/// - fails every task named in `failing`
/// - runs function tasks in-process
/// - answers command tasks with one string per declared output,
///   `"<task>.<field>"`, without spawning anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    executed: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
    local: LocalBackend,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(tasks.into_iter().map(Into::into));
        self
    }

    /// Shared handle to the execution log.
    pub fn executed_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl ExecutionBackend for RecordingBackend {
    fn execute<'a>(&'a mut self, task: &'a TaskSpec, inputs: &'a FieldValues) -> ExecFuture<'a> {
        self.executed.lock().unwrap().push(task.name.clone());

        if self.failing.contains(&task.name) {
            debug!(task = %task.name, "RecordingBackend: injecting failure");
            let failure = TaskFailure::new(format!("injected failure in '{}'", task.name))
                .with_trace("RecordingBackend");
            return Box::pin(async move { Err(failure) });
        }

        match &task.action {
            TaskAction::Function(_) => self.local.execute(task, inputs),
            TaskAction::Command(_) => {
                let outputs: FieldValues = task
                    .outputs
                    .iter()
                    .map(|field| (field.clone(), Value::String(format!("{}.{field}", task.name))))
                    .collect();
                Box::pin(async move { Ok(outputs) })
            }
        }
    }
}
