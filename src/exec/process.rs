// src/exec/process.rs

//! Child-process execution backend.
//!
//! Protocol for a command task:
//! - the command runs under a shell (`sh -c` / `cmd /C` by default),
//! - its connected inputs are written to stdin as one JSON object,
//! - it must print one JSON object of output fields to stdout (empty stdout
//!   means "no outputs"),
//! - a non-zero exit status is a failure; stderr is kept as the trace.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::TaskFailure;
use crate::types::FieldValues;
use crate::workflow::{TaskAction, TaskSpec};

use super::backend::{ExecFuture, ExecutionBackend};

/// Environment variable carrying the task name into the child process.
pub const TASK_NAME_ENV: &str = "FLOWRUN_TASK";

/// Shell used to interpret task commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub program: String,
    /// Flag that makes `program` run its next argument as a command line.
    pub arg: String,
}

impl Default for Shell {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                program: "cmd".to_string(),
                arg: "/C".to_string(),
            }
        } else {
            Self {
                program: "sh".to_string(),
                arg: "-c".to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessBackendOptions {
    /// Applied to tasks without their own timeout.
    pub default_timeout: Option<Duration>,
    pub shell: Shell,
}

/// Runs [`TaskAction::Command`] tasks as child processes and waits for them.
#[derive(Debug, Clone, Default)]
pub struct ProcessBackend {
    options: ProcessBackendOptions,
}

impl ProcessBackend {
    pub fn new(options: ProcessBackendOptions) -> Self {
        Self { options }
    }
}

impl ExecutionBackend for ProcessBackend {
    fn execute<'a>(&'a mut self, task: &'a TaskSpec, inputs: &'a FieldValues) -> ExecFuture<'a> {
        Box::pin(async move {
            let cmd = match &task.action {
                TaskAction::Command(cmd) => cmd,
                TaskAction::Function(_) => {
                    return Err(TaskFailure::new(format!(
                        "task '{}' is a {} task; the process backend can only run commands",
                        task.name,
                        task.action.kind()
                    )));
                }
            };

            let timeout = task.timeout.or(self.options.default_timeout);
            run_command(task, cmd, inputs, &self.options.shell, timeout).await
        })
    }
}

async fn run_command(
    task: &TaskSpec,
    cmd: &str,
    inputs: &FieldValues,
    shell: &Shell,
    timeout: Option<Duration>,
) -> Result<FieldValues, TaskFailure> {
    let start = Instant::now();
    info!(task = %task.name, cmd = %cmd, "starting task process");

    let payload = serde_json::to_vec(inputs).map_err(|e| {
        TaskFailure::new(format!("serializing inputs of task '{}'", task.name))
            .with_trace(e.to_string())
    })?;

    let mut child = Command::new(&shell.program)
        .arg(&shell.arg)
        .arg(cmd)
        .env(TASK_NAME_ENV, &task.name)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            TaskFailure::new(format!("spawning process for task '{}'", task.name))
                .with_trace(e.to_string())
        })?;

    // Feed stdin from a separate task so a child that writes a lot before
    // reading cannot block us.
    if let Some(mut stdin) = child.stdin.take() {
        let task_name = task.name.clone();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                // Commonly a broken pipe from a command that ignores stdin.
                debug!(task = %task_name, error = %e, "could not write inputs to stdin");
            }
        });
    }

    let wait = child.wait_with_output();
    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(res) => res,
            Err(_) => {
                warn!(task = %task.name, timeout_s = limit.as_secs_f64(), "task timed out");
                // Dropping the wait future drops the child, which kills it.
                return Err(TaskFailure::new(format!(
                    "task '{}' timed out after {:.2} s",
                    task.name,
                    limit.as_secs_f64()
                )));
            }
        },
        None => wait.await,
    }
    .map_err(|e| {
        TaskFailure::new(format!("waiting for process of task '{}'", task.name))
            .with_trace(e.to_string())
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines() {
        debug!(task = %task.name, "stderr: {}", line);
    }

    let code = output.status.code().unwrap_or(-1);
    info!(
        task = %task.name,
        exit_code = code,
        success = output.status.success(),
        walltime_s = start.elapsed().as_secs_f64(),
        "task process exited"
    );

    if !output.status.success() {
        return Err(
            TaskFailure::new(format!("task '{}' exited unsuccessfully", task.name))
                .with_exit_code(code)
                .with_trace(stderr),
        );
    }

    parse_outputs(&task.name, &output.stdout)
}

fn parse_outputs(task: &str, stdout: &[u8]) -> Result<FieldValues, TaskFailure> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Ok(FieldValues::new());
    }

    serde_json::from_str::<FieldValues>(text).map_err(|e| {
        TaskFailure::new(format!(
            "task '{task}' did not print a JSON object of outputs: {e}"
        ))
        .with_trace(text.to_string())
    })
}
