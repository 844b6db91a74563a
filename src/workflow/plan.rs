// src/workflow/plan.rs

//! Static, level-by-level view of a workflow's task graph.
//!
//! The scheduler never needs this (it finds the fixed point by polling), but
//! a precomputed plan is handy for `--dry-run` output and for spotting cycles
//! before running anything.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::types::TaskName;
use crate::workflow::model::Workflow;

/// Tasks grouped by the round in which the scheduler can first run them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// `levels[0]` depends only on workflow inputs, `levels[n]` on tasks in
    /// earlier levels. Each level keeps declaration order.
    pub levels: Vec<Vec<TaskName>>,
    /// Tasks on, or downstream of, a cycle. These can never run.
    pub blocked: Vec<TaskName>,
    /// One task on a cycle, if there is any cycle.
    pub cycle_hint: Option<TaskName>,
}

impl ExecutionPlan {
    pub fn from_workflow(workflow: &Workflow) -> Self {
        // Edge direction: producer -> consumer.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in workflow.task_names() {
            graph.add_node(name);
        }
        for task in workflow.tasks() {
            for upstream in task.upstream_tasks() {
                graph.add_edge(upstream, task.name.as_str(), ());
            }
        }

        let cycle_hint = toposort(&graph, None)
            .err()
            .map(|cycle| cycle.node_id().to_string());

        let mut placed: Vec<&str> = Vec::new();
        let mut levels = Vec::new();

        loop {
            let level: Vec<&str> = workflow
                .task_names()
                .filter(|name| !placed.contains(name))
                .filter(|name| {
                    graph
                        .neighbors_directed(*name, Direction::Incoming)
                        .all(|upstream| placed.contains(&upstream))
                })
                .collect();

            if level.is_empty() {
                break;
            }
            placed.extend(level.iter().copied());
            levels.push(level.into_iter().map(str::to_string).collect());
        }

        let blocked = workflow
            .task_names()
            .filter(|name| !placed.contains(name))
            .map(str::to_string)
            .collect();

        Self {
            levels,
            blocked,
            cycle_hint,
        }
    }

    pub fn is_runnable(&self) -> bool {
        self.blocked.is_empty()
    }
}
