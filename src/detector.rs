//! Completion detection over captured agent output.

/// Marker the agent prints once every work item passes
pub const DEFAULT_SENTINEL: &str = "<promise>COMPLETE</promise>";

/// Looks for the completion sentinel in agent output.
///
/// This is the only way a run ends in success. Ledger counts are never used to
/// infer completion: an agent may stop short on a blocker, and an agent that
/// declares completion is trusted even if the counts disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDetector {
    sentinel: String,
}

impl CompletionDetector {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Exact, case-sensitive substring match over the whole output
    pub fn check(&self, output: &str) -> bool {
        output.contains(&self.sentinel)
    }
}

impl Default for CompletionDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}
