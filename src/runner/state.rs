//! Loop state and outcomes.

use crate::ledger::LedgerSummary;

/// Where the iteration loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Not started
    Idle,
    /// Iterating
    Running,
    /// Agent emitted the completion sentinel
    Completed,
    /// Iteration budget spent without a completion signal (resumable)
    Exhausted,
    /// Ledger missing or malformed
    FatalSetupError,
    /// Operator interrupt
    Interrupted,
}

impl LoopStatus {
    /// Returns true if the loop has stopped
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoopStatus::Idle | LoopStatus::Running)
    }

    /// Returns true if rerunning is expected to make further progress
    pub fn is_resumable(&self) -> bool {
        matches!(self, LoopStatus::Exhausted | LoopStatus::Interrupted)
    }
}

/// Snapshot taken at the start of one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationState {
    /// 1-based
    pub iteration: u32,
    pub max_iterations: u32,
    pub total: usize,
    pub completed: usize,
}

impl IterationState {
    pub fn new(iteration: u32, max_iterations: u32, summary: &LedgerSummary) -> Self {
        Self {
            iteration,
            max_iterations,
            total: summary.total,
            completed: summary.completed,
        }
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

/// How a run ended, when it got past setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// Completion signal seen on `iterations`
    Completed { iterations: u32, summary: LedgerSummary },
    /// Ran `max_iterations` times without a completion signal
    Exhausted { max_iterations: u32, summary: LedgerSummary },
    /// Stopped by the operator during `iteration`
    Interrupted { iteration: u32 },
}

impl LoopOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            LoopOutcome::Completed { .. } => 0,
            LoopOutcome::Exhausted { .. } => 1,
            LoopOutcome::Interrupted { .. } => 130,
        }
    }

    pub fn status(&self) -> LoopStatus {
        match self {
            LoopOutcome::Completed { .. } => LoopStatus::Completed,
            LoopOutcome::Exhausted { .. } => LoopStatus::Exhausted,
            LoopOutcome::Interrupted { .. } => LoopStatus::Interrupted,
        }
    }
}
