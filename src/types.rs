// src/types.rs

//! Shared value types.

use indexmap::IndexMap;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// A single field value flowing between tasks.
pub type Value = serde_json::Value;

/// Named field values, in insertion order.
///
/// Used for workflow inputs, a task's connected inputs, a task's outputs and
/// the workflow's final outputs.
pub type FieldValues = IndexMap<String, Value>;
