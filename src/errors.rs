// src/errors.rs

//! Crate-wide error types.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid workflow inputs: {}", describe_input_mismatch(.missing, .extra))]
    InvalidInput {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error(
        "Deadlock: no task can make progress (unfinished tasks: {})",
        .unfinished.join(", ")
    )]
    Deadlock { unfinished: Vec<String> },

    #[error("Task '{task}' failed: {failure}")]
    TaskFailed {
        task: String,
        #[source]
        failure: TaskFailure,
    },

    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("Task '{task}' did not produce output field '{field}'")]
    MissingOutput { task: String, field: String },

    #[error("Input source '{0}' is not ready")]
    SourceNotReady(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task '{task}' received an unknown input field '{field}'")]
    UnknownInputField { task: String, field: String },

    #[error("Task '{0}' cannot finish before all of its inputs are connected")]
    InputsNotConnected(String),

    #[error("Task '{0}' has already finished")]
    TaskAlreadyFinished(String),

    #[error("Workflow run was aborted by an earlier error")]
    RunAborted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

fn describe_input_mismatch(missing: &[String], extra: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!(
            "the following input fields need to be specified: {}",
            missing.join(",")
        ));
    }
    if !extra.is_empty() {
        parts.push(format!(
            "the following provided inputs were not recognized: {}",
            extra.join(",")
        ));
    }
    parts.join("; ")
}

/// Failure reported by an execution backend for a single task.
///
/// The scheduler never interprets this; it is carried inside
/// [`FlowError::TaskFailed`] so callers can inspect the diagnostic trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub message: String,
    /// Captured diagnostics (stderr, error chain, panic payload).
    pub trace: Option<String>,
    pub exit_code: Option<i32>,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
            exit_code: None,
        }
    }

    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Build a failure from an `anyhow` error, keeping the full cause chain
    /// as the trace.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::new(err.to_string()).with_trace(format!("{err:?}"))
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} (exit code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TaskFailure {}
