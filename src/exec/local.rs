// src/exec/local.rs

//! In-process execution backend.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::errors::TaskFailure;
use crate::types::FieldValues;
use crate::workflow::{TaskAction, TaskSpec};

use super::backend::{ExecFuture, ExecutionBackend};

/// Runs a task's [`TaskAction::Function`] directly on the calling thread.
///
/// Errors returned by the function and panics raised inside it are both
/// captured as a [`TaskFailure`]. Command tasks are rejected; use the
/// process backend for those.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionBackend for LocalBackend {
    fn execute<'a>(&'a mut self, task: &'a TaskSpec, inputs: &'a FieldValues) -> ExecFuture<'a> {
        let result = run_in_process(task, inputs);
        Box::pin(async move { result })
    }
}

fn run_in_process(task: &TaskSpec, inputs: &FieldValues) -> Result<FieldValues, TaskFailure> {
    let func = match &task.action {
        TaskAction::Function(func) => func,
        TaskAction::Command(_) => {
            return Err(TaskFailure::new(format!(
                "task '{}' is a {} task; the in-process backend can only call functions",
                task.name,
                task.action.kind()
            )));
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| func.call(inputs))) {
        Ok(Ok(outputs)) => Ok(outputs),
        Ok(Err(err)) => Err(TaskFailure::from_error(&err)),
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            warn!(task = %task.name, panic = %msg, "task function panicked");
            Err(TaskFailure::new(format!("task '{}' panicked", task.name)).with_trace(msg))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
