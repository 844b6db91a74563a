// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawWorkflowFile;
use crate::errors::Result;
use crate::workflow::Workflow;

/// Load a workflow file from a given path and return the raw
/// `RawWorkflowFile`.
///
/// This only performs TOML deserialization; it does **not** check source
/// syntax or references. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents)
}

/// Deserialize a workflow file from TOML text.
pub fn parse_str(contents: &str) -> Result<RawWorkflowFile> {
    let raw: RawWorkflowFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a workflow file and turn it into a validated [`Workflow`].
///
/// If the file does not set `[workflow].name`, the file stem is used.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Workflow> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;

    if raw.workflow.name.is_none() {
        raw.workflow.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }

    let workflow = Workflow::try_from(raw)?;
    debug!(path = %path.display(), workflow = %workflow.name(), "workflow file loaded");
    Ok(workflow)
}

/// Default workflow file path: `Flowrun.toml` in the current directory.
pub fn default_workflow_path() -> PathBuf {
    PathBuf::from("Flowrun.toml")
}
