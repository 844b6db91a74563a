// src/engine/mod.rs

//! Scheduling engine.
//!
//! The pure, synchronous state lives in [`scheduler`] (per-run inputs plus
//! one [`TaskRunner`] per task, see [`task_runner`]). The async shell in
//! [`runner`] drives it round by round:
//!
//! 1. connect every input field whose source has become ready,
//! 2. execute every fully connected, unfinished task through an
//!    [`ExecutionBackend`](crate::exec::ExecutionBackend),
//! 3. stop when all tasks are finished, or fail with a deadlock when a round
//!    connects nothing and finishes nothing.
//!
//! [`round`] holds the per-round result type.

pub mod round;
pub mod runner;
pub mod scheduler;
pub mod task_runner;

pub use round::RoundStep;
pub use runner::WorkflowRunner;
pub use scheduler::Scheduler;
pub use task_runner::TaskRunner;
