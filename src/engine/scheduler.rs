// src/engine/scheduler.rs

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::engine::round::RoundStep;
use crate::engine::task_runner::TaskRunner;
use crate::errors::{FlowError, Result, TaskFailure};
use crate::types::{FieldValues, TaskName, Value};
use crate::workflow::{InputSource, SourceState, TaskSpec, Workflow};

/// Pure, synchronous scheduling state for one run.
///
/// Owns the validated workflow inputs and one [`TaskRunner`] per task, in
/// declaration order. It is the only thing that mutates runner state; task
/// runners never see each other except through [`InputSource`] lookups
/// against the scheduler.
///
/// It performs no IO. The async shell
/// ([`WorkflowRunner`](crate::engine::WorkflowRunner)) drives it round by
/// round and executes ready tasks through a backend.
#[derive(Debug)]
pub struct Scheduler {
    inputs: FieldValues,
    runners: IndexMap<TaskName, TaskRunner>,
    round: u64,
}

impl Scheduler {
    /// Build per-run state. `inputs` must already be validated against the
    /// workflow's declared input fields.
    pub fn new(workflow: &Workflow, inputs: FieldValues) -> Self {
        let runners = workflow
            .tasks()
            .map(|spec| (spec.name.clone(), TaskRunner::new(spec.clone())))
            .collect();

        Self {
            inputs,
            runners,
            round: 0,
        }
    }

    /// Number of rounds started so far.
    pub fn current_round(&self) -> u64 {
        self.round
    }

    pub fn task(&self, name: &str) -> Option<&TaskRunner> {
        self.runners.get(name)
    }

    /// Task runners in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskRunner> {
        self.runners.values()
    }

    pub fn all_finished(&self) -> bool {
        self.runners.values().all(TaskRunner::finished)
    }

    pub fn unfinished_tasks(&self) -> Vec<TaskName> {
        self.runners
            .values()
            .filter(|r| !r.finished())
            .map(|r| r.name().clone())
            .collect()
    }

    /// Start a new round: connect every not-yet-connected input field, of
    /// every unfinished task, whose source is now ready.
    ///
    /// Returns the number of newly connected fields.
    pub fn begin_round(&mut self) -> Result<usize> {
        self.round += 1;

        // Resolve against the current state first, then apply. Connections
        // made in this pass never make another field ready (only finished
        // tasks do), so a single pass reaches this round's fixed point.
        let mut connections: Vec<(TaskName, String, Value)> = Vec::new();
        for runner in self.runners.values().filter(|r| !r.finished()) {
            for (field, source) in runner.pending_inputs() {
                if source.ready(self) {
                    let value = source.get_value(self)?;
                    connections.push((runner.name().clone(), field.clone(), value));
                } else {
                    trace!(
                        task = %runner.name(),
                        field = %field,
                        source = %source,
                        "input source not ready yet"
                    );
                }
            }
        }

        let mut connected = 0;
        for (task, field, value) in connections {
            let runner = self
                .runners
                .get_mut(&task)
                .ok_or_else(|| FlowError::TaskNotFound(task.clone()))?;
            if runner.connect_input(&field, value)? {
                connected += 1;
            }
        }

        debug!(round = self.round, connected, "scheduler: inputs connected");
        Ok(connected)
    }

    /// Tasks that are fully connected but not finished, in declaration order.
    pub fn ready_tasks(&self) -> Vec<TaskName> {
        self.runners
            .values()
            .filter(|r| !r.finished() && r.ready())
            .map(|r| r.name().clone())
            .collect()
    }

    /// Record a task's outputs and mark it finished in the current round.
    pub fn complete_task(&mut self, task: &str, outputs: FieldValues) -> Result<()> {
        let round = self.round;
        let runner = self
            .runners
            .get_mut(task)
            .ok_or_else(|| FlowError::TaskNotFound(task.to_string()))?;
        runner.mark_finished(outputs, round)?;
        debug!(task, round, "scheduler: task finished");
        Ok(())
    }

    /// Resolve a source against the current state.
    pub fn resolve(&self, source: &InputSource) -> Result<Value> {
        source.get_value(self)
    }

    /// Run one full round synchronously, executing ready tasks with `exec`.
    ///
    /// Manual-step variant of the loop in `WorkflowRunner::run`, for callers
    /// that want to drive the scheduler without an async backend.
    pub fn step_with<F>(&mut self, mut exec: F) -> Result<RoundStep>
    where
        F: FnMut(&TaskSpec, &FieldValues) -> std::result::Result<FieldValues, TaskFailure>,
    {
        let connected_fields = self.begin_round()?;
        let ready = self.ready_tasks();
        let mut finished = Vec::with_capacity(ready.len());

        for name in &ready {
            let runner = self
                .runners
                .get(name)
                .ok_or_else(|| FlowError::TaskNotFound(name.clone()))?;
            let outputs = exec(runner.spec(), runner.inputs()?).map_err(|failure| {
                FlowError::TaskFailed {
                    task: name.clone(),
                    failure,
                }
            })?;
            self.complete_task(name, outputs)?;
            finished.push(name.clone());
        }

        Ok(RoundStep {
            round: self.round,
            connected_fields,
            ready,
            finished,
            all_finished: self.all_finished(),
        })
    }
}

impl SourceState for Scheduler {
    fn workflow_input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    fn task_finished(&self, task: &str) -> bool {
        self.runners.get(task).is_some_and(TaskRunner::finished)
    }

    fn task_output(&self, task: &str, field: &str) -> Option<&Value> {
        self.runners.get(task)?.output(field)
    }
}
