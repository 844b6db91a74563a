// src/engine/task_runner.rs

//! Live, per-run state of a single task.

use tracing::{debug, warn};

use crate::errors::{FlowError, Result};
use crate::types::{FieldValues, TaskName, Value};
use crate::workflow::{InputSource, TaskSpec};

/// Wraps one [`TaskSpec`] with the state of the current run.
///
/// Invariants:
/// - `connected` only grows; a connected field is never overwritten.
/// - `finished` flips from `false` to `true` at most once.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    spec: TaskSpec,
    connected: FieldValues,
    outputs: FieldValues,
    finished: bool,
    /// Scheduler round in which the task finished.
    finished_round: Option<u64>,
}

impl TaskRunner {
    pub fn new(spec: TaskSpec) -> Self {
        Self {
            spec,
            connected: FieldValues::new(),
            outputs: FieldValues::new(),
            finished: false,
            finished_round: None,
        }
    }

    pub fn name(&self) -> &TaskName {
        &self.spec.name
    }

    pub fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    /// True once every declared input field is connected.
    pub fn ready(&self) -> bool {
        self.spec
            .inputs
            .keys()
            .all(|field| self.connected.contains_key(field))
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn finished_round(&self) -> Option<u64> {
        self.finished_round
    }

    /// Inputs connected so far (possibly partial).
    pub fn connected(&self) -> &FieldValues {
        &self.connected
    }

    /// The complete input set; only available once the task is ready.
    pub fn inputs(&self) -> Result<&FieldValues> {
        if self.ready() {
            Ok(&self.connected)
        } else {
            Err(FlowError::InputsNotConnected(self.spec.name.clone()))
        }
    }

    /// Declared input fields that are not connected yet, with their sources.
    pub fn pending_inputs(&self) -> impl Iterator<Item = (&String, &InputSource)> {
        self.spec
            .inputs
            .iter()
            .filter(|(field, _)| !self.connected.contains_key(*field))
    }

    /// Recorded outputs (empty until finished).
    pub fn outputs(&self) -> &FieldValues {
        &self.outputs
    }

    pub fn output(&self, field: &str) -> Option<&Value> {
        self.outputs.get(field)
    }

    /// Connect a value to an input field.
    ///
    /// Returns `Ok(false)` without touching the existing value if the field
    /// is already connected.
    pub fn connect_input(&mut self, field: &str, value: Value) -> Result<bool> {
        if !self.spec.inputs.contains_key(field) {
            return Err(FlowError::UnknownInputField {
                task: self.spec.name.clone(),
                field: field.to_string(),
            });
        }
        if self.connected.contains_key(field) {
            return Ok(false);
        }

        debug!(task = %self.spec.name, field, "input connected");
        self.connected.insert(field.to_string(), value);
        Ok(true)
    }

    /// Record the task's result and mark it finished.
    ///
    /// Only declared output fields are kept; anything else the backend
    /// returned is dropped.
    pub fn mark_finished(&mut self, outputs: FieldValues, round: u64) -> Result<()> {
        if self.finished {
            return Err(FlowError::TaskAlreadyFinished(self.spec.name.clone()));
        }
        if !self.ready() {
            return Err(FlowError::InputsNotConnected(self.spec.name.clone()));
        }

        let mut recorded = FieldValues::with_capacity(self.spec.outputs.len());
        for (field, value) in outputs {
            if self.spec.outputs.contains(&field) {
                recorded.insert(field, value);
            } else {
                warn!(
                    task = %self.spec.name,
                    field = %field,
                    "task produced an undeclared output field; dropping it"
                );
            }
        }

        for field in &self.spec.outputs {
            if !recorded.contains_key(field) {
                warn!(
                    task = %self.spec.name,
                    field = %field,
                    "task did not produce a declared output field"
                );
            }
        }

        self.outputs = recorded;
        self.finished = true;
        self.finished_round = Some(round);
        Ok(())
    }
}
