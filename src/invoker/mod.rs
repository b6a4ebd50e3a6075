//! Agent invocation.
//!
//! One invocation runs the external agent once, hands it the work group's
//! context files, and captures everything it prints while forwarding it live.
//!
//! - `AgentInvoker`: the seam the iteration loop drives
//! - `ProcessInvoker`: spawns the configured agent command
//! - `TeeWriter`: accumulates output while forwarding it to the console

mod process;
mod tee;

use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

pub use process::ProcessInvoker;
pub use tee::TeeWriter;

/// Why an invocation did not finish cleanly.
///
/// None of these stop a run; the loop treats them as "no completion signal".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    #[error("failed to launch '{command}': {reason}")]
    Launch { command: String, reason: String },

    #[error("agent exited with status {0}")]
    NonZeroExit(i32),

    #[error("agent was terminated by a signal")]
    Terminated,

    #[error("agent timed out after {0}ms and was killed")]
    TimedOut(u64),

    #[error("failed to capture agent output: {0}")]
    Capture(String),
}

/// Output of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// Interleaved stdout and stderr, in arrival order
    pub output: String,
    pub error: Option<InvocationError>,
}

impl InvocationResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(output: impl Into<String>, error: InvocationError) -> Self {
        Self {
            output: output.into(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the agent once.
///
/// Implementations must write every chunk of agent output to `live` as it
/// arrives and also return the full concatenation. Failures are reported in
/// the result, never as a panic or an early return.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn run(&self, context: &[PathBuf], live: &mut (dyn Write + Send)) -> InvocationResult;
}
