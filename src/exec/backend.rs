// src/exec/backend.rs

//! Pluggable execution backend abstraction.
//!
//! The workflow runner talks to an `ExecutionBackend` instead of running task
//! actions itself. This keeps the scheduling loop identical whether tasks
//! run in-process ([`LocalBackend`](super::LocalBackend)), in a child process
//! ([`ProcessBackend`](super::ProcessBackend)) or in a fake used by tests.

use std::future::Future;
use std::pin::Pin;

use crate::errors::TaskFailure;
use crate::types::FieldValues;
use crate::workflow::TaskSpec;

/// Future returned by [`ExecutionBackend::execute`].
pub type ExecFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<FieldValues, TaskFailure>> + Send + 'a>>;

/// Trait abstracting how a single task is executed.
///
/// The runner awaits each returned future before looking at the next task,
/// so from the scheduler's point of view execution is blocking. A backend is
/// free to do its work elsewhere (a thread pool, a child process, a remote
/// worker) as long as the future resolves only once the task has really
/// completed or failed.
pub trait ExecutionBackend: Send {
    /// Execute `task` with its fully connected `inputs`.
    ///
    /// Returns the task's output fields, or a [`TaskFailure`] describing what
    /// went wrong. The implementation is responsible for any packaging,
    /// transport and cleanup.
    fn execute<'a>(&'a mut self, task: &'a TaskSpec, inputs: &'a FieldValues) -> ExecFuture<'a>;
}

impl<B: ExecutionBackend + ?Sized> ExecutionBackend for Box<B> {
    fn execute<'a>(&'a mut self, task: &'a TaskSpec, inputs: &'a FieldValues) -> ExecFuture<'a> {
        (**self).execute(task, inputs)
    }
}
