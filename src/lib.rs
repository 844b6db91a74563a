// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod workflow;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{collect_inputs, CliArgs};
use crate::config::load_and_validate;
use crate::engine::WorkflowRunner;
use crate::exec::{ProcessBackend, ProcessBackendOptions};
use crate::workflow::{ExecutionPlan, TaskAction, Workflow};

pub use crate::engine::{Scheduler, TaskRunner};
pub use crate::errors::{FlowError, TaskFailure};
pub use crate::workflow::{InputSource, TaskSpec, WorkflowBuilder};

/// High-level entry point used by `main.rs`; writes to stdout.
pub async fn run(args: CliArgs) -> Result<()> {
    run_to(args, &mut io::stdout()).await
}

/// Same as [`run`], writing the dry-run report or the JSON outputs to `out`.
///
/// This wires together:
/// - workflow file loading
/// - input collection from the command line
/// - the process execution backend
/// - the workflow runner, printing outputs as JSON on success
pub async fn run_to<W: Write>(args: CliArgs, out: &mut W) -> Result<()> {
    let path = args.workflow;
    let workflow = load_and_validate(&path)
        .with_context(|| format!("loading workflow file '{}'", path.display()))?;

    if args.dry_run {
        print_dry_run(&workflow, out)?;
        return Ok(());
    }

    let inputs = collect_inputs(&args.inputs);

    let backend = ProcessBackend::new(ProcessBackendOptions {
        default_timeout: args.timeout_secs.map(Duration::from_secs),
        ..ProcessBackendOptions::default()
    });

    let mut runner = WorkflowRunner::with_backend(workflow, backend, inputs)?;
    let outputs = runner.run().await?;

    info!(outputs = outputs.len(), "writing workflow outputs");
    writeln!(out, "{}", serde_json::to_string_pretty(&outputs)?)?;
    Ok(())
}

/// Simple dry-run output: inputs, tasks with their bindings, outputs and the
/// level-by-level plan.
fn print_dry_run<W: Write>(workflow: &Workflow, out: &mut W) -> io::Result<()> {
    writeln!(out, "flowrun dry-run: {}", workflow.name())?;
    writeln!(out)?;

    let inputs: Vec<&str> = workflow.input_fields().iter().map(String::as_str).collect();
    writeln!(out, "inputs: {inputs:?}")?;
    writeln!(out)?;

    writeln!(out, "tasks ({}):", workflow.task_count())?;
    for task in workflow.tasks() {
        writeln!(out, "  - {}", task.name)?;
        if let TaskAction::Command(cmd) = &task.action {
            writeln!(out, "      cmd: {cmd}")?;
        }
        for (field, source) in &task.inputs {
            writeln!(out, "      in:  {field} <- {source}")?;
        }
        for field in &task.outputs {
            writeln!(out, "      out: {field}")?;
        }
        if let Some(timeout) = task.timeout {
            writeln!(out, "      timeout: {}s", timeout.as_secs())?;
        }
    }
    writeln!(out)?;

    writeln!(out, "outputs:")?;
    for (field, source) in workflow.output_fields() {
        writeln!(out, "  {field} <- {source}")?;
    }
    writeln!(out)?;

    let plan = ExecutionPlan::from_workflow(workflow);
    writeln!(out, "plan:")?;
    for (i, level) in plan.levels.iter().enumerate() {
        writeln!(out, "  round {}: {}", i + 1, level.join(", "))?;
    }
    if !plan.is_runnable() {
        writeln!(
            out,
            "  blocked (cycle involving '{}'): {}",
            plan.cycle_hint.as_deref().unwrap_or("?"),
            plan.blocked.join(", ")
        )?;
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
