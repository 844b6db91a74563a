// src/config/mod.rs

//! Workflow file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a workflow file from disk (`loader.rs`).
//! - Convert it into a validated [`Workflow`](crate::workflow::Workflow)
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_workflow_path, load_and_validate, load_from_path, parse_str};
pub use model::{RawWorkflowFile, TaskConfig, WorkflowSection};
