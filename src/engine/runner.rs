// src/engine/runner.rs

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::engine::round::RoundStep;
use crate::engine::scheduler::Scheduler;
use crate::engine::task_runner::TaskRunner;
use crate::errors::{FlowError, Result};
use crate::exec::{ExecutionBackend, LocalBackend};
use crate::types::FieldValues;
use crate::workflow::Workflow;

/// Runs one workflow once.
///
/// Validates the supplied inputs at construction, then [`run`](Self::run)
/// drives the [`Scheduler`] round by round, dispatching ready tasks to the
/// backend `B`, until every task has finished (outputs are collected) or no
/// progress is possible (deadlock).
///
/// A runner is single-use: create a new one (the `Workflow` is cheap to
/// clone) for every run.
pub struct WorkflowRunner<B: ExecutionBackend = LocalBackend> {
    workflow: Workflow,
    scheduler: Scheduler,
    backend: B,
    finished: bool,
    aborted: bool,
    outputs: Option<FieldValues>,
}

impl<B: ExecutionBackend> fmt::Debug for WorkflowRunner<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRunner")
            .field("workflow", &self.workflow.name())
            .field("scheduler", &self.scheduler)
            .field("finished", &self.finished)
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}

impl WorkflowRunner<LocalBackend> {
    /// Runner that executes task functions in-process.
    pub fn new(workflow: Workflow, inputs: FieldValues) -> Result<Self> {
        Self::with_backend(workflow, LocalBackend::new(), inputs)
    }
}

impl<B: ExecutionBackend> WorkflowRunner<B> {
    /// Runner that delegates execution to `backend`.
    ///
    /// Fails with [`FlowError::InvalidInput`] if `inputs` does not supply
    /// exactly the workflow's declared input fields.
    pub fn with_backend(workflow: Workflow, backend: B, inputs: FieldValues) -> Result<Self> {
        validate_inputs(&workflow, &inputs)?;
        let scheduler = Scheduler::new(&workflow, inputs);

        Ok(Self {
            workflow,
            scheduler,
            backend,
            finished: false,
            aborted: false,
            outputs: None,
        })
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// True once `run` completed successfully.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Workflow outputs; `Some` only after a successful `run`.
    pub fn outputs(&self) -> Option<&FieldValues> {
        self.outputs.as_ref()
    }

    /// Per-task state, for inspection after (or during) a run.
    pub fn task(&self, name: &str) -> Option<&TaskRunner> {
        self.scheduler.task(name)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskRunner> {
        self.scheduler.tasks()
    }

    /// Run the workflow to completion and return its outputs.
    ///
    /// Errors are fatal to the run: after a failure every later call returns
    /// [`FlowError::RunAborted`]. Calling `run` again after success returns
    /// the same outputs without executing anything.
    pub async fn run(&mut self) -> Result<FieldValues> {
        if let Some(outputs) = &self.outputs {
            return Ok(outputs.clone());
        }
        if self.aborted {
            return Err(FlowError::RunAborted);
        }

        let start = Instant::now();
        info!(
            workflow = %self.workflow.name(),
            tasks = self.workflow.task_count(),
            "starting workflow"
        );

        match self.run_inner().await {
            Ok(outputs) => {
                info!(
                    workflow = %self.workflow.name(),
                    rounds = self.scheduler.current_round(),
                    walltime_s = start.elapsed().as_secs_f64(),
                    "workflow finished"
                );
                self.finished = true;
                self.outputs = Some(outputs.clone());
                Ok(outputs)
            }
            Err(err) => {
                error!(workflow = %self.workflow.name(), error = %err, "workflow failed");
                self.aborted = true;
                Err(err)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<FieldValues> {
        loop {
            let step = self.run_round().await?;
            debug!(?step, "round complete");

            if step.all_finished {
                break;
            }
            if !step.made_progress() {
                let unfinished = self.scheduler.unfinished_tasks();
                error!(
                    round = step.round,
                    ?unfinished,
                    "no task can make progress; workflow is deadlocked"
                );
                return Err(FlowError::Deadlock { unfinished });
            }
        }

        self.collect_outputs()
    }

    /// One scheduling round: connect ready inputs, then execute every task
    /// that is fully connected, in declaration order.
    async fn run_round(&mut self) -> Result<RoundStep> {
        let connected_fields = self.scheduler.begin_round()?;
        let ready = self.scheduler.ready_tasks();
        let mut finished = Vec::with_capacity(ready.len());

        for name in &ready {
            let outputs = {
                let runner = self
                    .scheduler
                    .task(name)
                    .ok_or_else(|| FlowError::TaskNotFound(name.clone()))?;
                let inputs = runner.inputs()?;
                let spec = runner.spec();

                let task_start = Instant::now();
                info!(task = %name, action = spec.action.kind(), "running task");
                for (field, source) in &spec.inputs {
                    debug!(task = %name, field = %field, source = %source, "input binding");
                }

                let result = self.backend.execute(spec, inputs).await;
                match result {
                    Ok(outputs) => {
                        info!(
                            task = %name,
                            walltime_s = task_start.elapsed().as_secs_f64(),
                            "task done"
                        );
                        outputs
                    }
                    Err(failure) => {
                        error!(task = %name, failure = %failure, "task execution failed");
                        if let Some(trace) = &failure.trace {
                            error!(task = %name, "task failure trace:\n{}", trace);
                        }
                        return Err(FlowError::TaskFailed {
                            task: name.clone(),
                            failure,
                        });
                    }
                }
            };

            self.scheduler.complete_task(name, outputs)?;
            finished.push(name.clone());
        }

        Ok(RoundStep {
            round: self.scheduler.current_round(),
            connected_fields,
            ready,
            finished,
            all_finished: self.scheduler.all_finished(),
        })
    }

    /// Resolve every workflow output. Either all fields resolve or the
    /// caller gets an error and no outputs.
    fn collect_outputs(&self) -> Result<FieldValues> {
        let mut outputs = FieldValues::with_capacity(self.workflow.output_fields().len());
        for (field, source) in self.workflow.output_fields() {
            outputs.insert(field.clone(), self.scheduler.resolve(source)?);
        }
        Ok(outputs)
    }
}

/// Supplied inputs must match the declared input fields exactly.
fn validate_inputs(workflow: &Workflow, inputs: &FieldValues) -> Result<()> {
    let expected = workflow.input_fields();
    let provided: BTreeSet<String> = inputs.keys().cloned().collect();

    let missing: Vec<String> = expected.difference(&provided).cloned().collect();
    let extra: Vec<String> = provided.difference(expected).cloned().collect();

    if missing.is_empty() && extra.is_empty() {
        return Ok(());
    }

    Err(FlowError::InvalidInput { missing, extra })
}
