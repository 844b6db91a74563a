// src/config/model.rs

use indexmap::IndexMap;
use serde::Deserialize;

/// A workflow file as read from TOML, before validation.
///
/// ```toml
/// [workflow]
/// name = "doubler"
/// inputs = ["x"]
///
/// [workflow.outputs]
/// z = "T1.y"
///
/// [task.T1]
/// cmd = "jq '{y: (.x * 2)}'"
/// inputs = { x = "input.x" }
/// outputs = ["y"]
/// ```
///
/// Task declaration order in the file is preserved.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawWorkflowFile {
    /// Workflow-level settings from `[workflow]`.
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: IndexMap<String, TaskConfig>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct WorkflowSection {
    /// Display name; the loader falls back to the file stem.
    #[serde(default)]
    pub name: Option<String>,

    /// Declared workflow input fields. A run must supply exactly these.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Workflow output field → source (`"input.<name>"` or
    /// `"<task>.<field>"`).
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Shell command to execute. Receives its inputs as a JSON object on
    /// stdin and prints a JSON object of outputs on stdout.
    pub cmd: String,

    /// Input field → source (`"input.<name>"` or `"<task>.<field>"`).
    #[serde(default)]
    pub inputs: IndexMap<String, String>,

    /// Output field names this task produces.
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Optional per-task execution timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}
