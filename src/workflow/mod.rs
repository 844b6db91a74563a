// src/workflow/mod.rs

//! Static workflow description.
//!
//! - [`source`] defines [`InputSource`], the reference from a field to the
//!   value that feeds it, and how it resolves against a run's state.
//! - [`task`] holds the immutable [`TaskSpec`] and its [`TaskAction`].
//! - [`model`] is the validated, immutable [`Workflow`].
//! - [`builder`] constructs workflows and enforces the no-dangling-reference
//!   invariant.
//! - [`plan`] computes a static level-by-level [`ExecutionPlan`] (used for
//!   dry runs and diagnostics).

pub mod builder;
pub mod model;
pub mod plan;
pub mod source;
pub mod task;

pub use builder::WorkflowBuilder;
pub use model::Workflow;
pub use plan::ExecutionPlan;
pub use source::{InputSource, SourceState};
pub use task::{TaskAction, TaskFn, TaskSpec};
