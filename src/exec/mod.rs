// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the `ExecutionBackend` trait the workflow runner
//!   dispatches through.
//! - [`local`] runs task functions in-process (`LocalBackend`).
//! - [`process`] runs command tasks as child processes (`ProcessBackend`),
//!   passing inputs and outputs as JSON over stdin/stdout.

pub mod backend;
pub mod local;
pub mod process;

pub use backend::{ExecFuture, ExecutionBackend};
pub use local::LocalBackend;
pub use process::{ProcessBackend, ProcessBackendOptions, Shell};
