// src/engine/round.rs

//! Per-round result type for the scheduler.

use crate::types::TaskName;

/// Structured result of a single scheduling round.
///
/// Useful for tests that step the scheduler by hand and want to assert on
/// what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundStep {
    /// 1-based round number.
    pub round: u64,
    /// Number of input fields connected during this round.
    pub connected_fields: usize,
    /// Tasks that were fully connected and unfinished at the start of the
    /// execute phase, in declaration order.
    pub ready: Vec<TaskName>,
    /// Tasks that finished during this round.
    pub finished: Vec<TaskName>,
    /// Whether every task is finished after this round.
    pub all_finished: bool,
}

impl RoundStep {
    /// Newly connected fields and newly finished tasks both count as
    /// progress.
    pub fn made_progress(&self) -> bool {
        self.connected_fields > 0 || !self.finished.is_empty()
    }
}
