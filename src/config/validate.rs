// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawWorkflowFile, TaskConfig};
use crate::errors::{FlowError, Result};
use crate::workflow::{InputSource, TaskSpec, Workflow, WorkflowBuilder};

/// Name used when neither the file nor the loader provides one.
pub const DEFAULT_WORKFLOW_NAME: &str = "workflow";

impl TryFrom<RawWorkflowFile> for Workflow {
    type Error = FlowError;

    fn try_from(raw: RawWorkflowFile) -> std::result::Result<Self, Self::Error> {
        let name = raw
            .workflow
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_WORKFLOW_NAME.to_string());

        let mut builder = WorkflowBuilder::new(name);

        for field in raw.workflow.inputs {
            builder = builder.input(field);
        }

        for (task_name, task) in raw.task {
            builder = builder.task(task_spec_from_config(&task_name, task)?);
        }

        for (field, source) in raw.workflow.outputs {
            let source = parse_source(&source, || format!("workflow output '{field}'"))?;
            builder = builder.output(field, source);
        }

        builder.build()
    }
}

fn task_spec_from_config(name: &str, task: TaskConfig) -> Result<TaskSpec> {
    if task.cmd.trim().is_empty() {
        return Err(FlowError::InvalidWorkflow(format!(
            "task '{name}' has an empty `cmd`"
        )));
    }

    let mut spec = TaskSpec::command(name, task.cmd);

    for (field, source) in task.inputs {
        let source = parse_source(&source, || format!("input '{field}' of task '{name}'"))?;
        spec = spec.input(field, source);
    }

    for field in task.outputs {
        spec = spec.output(field);
    }

    match task.timeout_secs {
        Some(0) => {
            return Err(FlowError::InvalidWorkflow(format!(
                "task '{name}' has `timeout_secs = 0`; it must be >= 1"
            )));
        }
        Some(secs) => spec = spec.timeout(Duration::from_secs(secs)),
        None => {}
    }

    Ok(spec)
}

fn parse_source(raw: &str, owner: impl FnOnce() -> String) -> Result<InputSource> {
    raw.parse::<InputSource>()
        .map_err(|msg| FlowError::InvalidWorkflow(format!("{}: {msg}", owner())))
}
