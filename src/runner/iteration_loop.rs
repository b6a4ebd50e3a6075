//! The iteration loop - run the agent until it signals completion or the budget runs out.
//!
//! Each iteration:
//! 1. Re-reads the ledger (the agent rewrites it between rounds)
//! 2. Prints the iteration banner
//! 3. Invokes the agent with the work group's context files
//! 4. Checks the captured output for the completion sentinel
//! 5. On no signal: pauses briefly and goes again

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use super::interrupt::InterruptSignal;
use super::state::{IterationState, LoopOutcome, LoopStatus};
use crate::config::RunConfig;
use crate::detector::CompletionDetector;
use crate::display;
use crate::error::Result;
use crate::invoker::AgentInvoker;
use crate::ledger::{self, LedgerSummary};
use crate::workspace::WorkPaths;

/// Configuration for the IterationLoop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum agent invocations per run
    pub max_iterations: u32,
    /// Pause between an unsuccessful iteration and the next
    pub iteration_delay: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for LoopConfig {
    fn from(config: &RunConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            iteration_delay: Duration::from_millis(config.iteration_delay_ms),
        }
    }
}

/// Drives one run over a single work group.
///
/// The loop only reads the ledger. A resumed run starts counting at 1 again.
pub struct IterationLoop<I>
where
    I: AgentInvoker,
{
    invoker: Arc<I>,
    detector: CompletionDetector,
    paths: WorkPaths,
    config: LoopConfig,
    status: LoopStatus,
    invocations: u32,
}

impl<I> IterationLoop<I>
where
    I: AgentInvoker,
{
    pub fn new(invoker: Arc<I>, detector: CompletionDetector, paths: WorkPaths, config: LoopConfig) -> Self {
        Self {
            invoker,
            detector,
            paths,
            config,
            status: LoopStatus::Idle,
            invocations: 0,
        }
    }

    pub fn status(&self) -> LoopStatus {
        self.status
    }

    /// Agent invocations performed by the last `run`
    pub fn invocations(&self) -> u32 {
        self.invocations
    }

    /// Run until completion, exhaustion or interrupt.
    ///
    /// Progress and agent output are written to `console`; write failures there
    /// are logged and ignored. A ledger that is
    /// missing or malformed is returned as an error, before the first invocation
    /// or at whichever iteration finds it broken.
    pub async fn run(&mut self, console: &mut (dyn Write + Send), mut interrupt: InterruptSignal) -> Result<LoopOutcome> {
        self.invocations = 0;
        let context: Vec<PathBuf> = self.paths.context_paths();

        let mut summary = self.summarize()?;
        self.status = LoopStatus::Running;
        log::info!(
            "Starting run for {} ({}/{} completed, max {} iterations)",
            self.paths.selector,
            summary.completed,
            summary.total,
            self.config.max_iterations
        );

        for iteration in 1..=self.config.max_iterations {
            if interrupt.is_triggered() {
                return self.interrupted(console, iteration);
            }
            if iteration > 1 {
                summary = self.summarize()?;
            }

            let state = IterationState::new(iteration, self.config.max_iterations, &summary);
            show(
                console,
                &display::iteration_banner(&state, summary.next_pending.as_ref(), Local::now()),
            );
            log::info!(
                "Iteration {}/{}: {} remaining",
                iteration,
                self.config.max_iterations,
                state.remaining()
            );

            let result = tokio::select! {
                result = self.invoker.run(&context, console) => Some(result),
                _ = interrupt.triggered() => None,
            };
            let Some(result) = result else {
                return self.interrupted(console, iteration);
            };
            self.invocations += 1;

            if let Some(error) = &result.error {
                log::warn!("Iteration {} invocation error: {}", iteration, error);
                show(console, &format!("\n{}\n", display::invocation_failed(iteration, error)));
            }

            if self.detector.check(&result.output) {
                // Counts are for display only; the sentinel alone decides completion
                let summary = ledger::summarize(&self.paths.ledger).unwrap_or(summary);
                self.status = LoopStatus::Completed;
                log::info!("Completion signal received on iteration {}", iteration);
                show(console, &display::completed(iteration, &summary));
                return Ok(LoopOutcome::Completed {
                    iterations: iteration,
                    summary,
                });
            }

            if iteration < self.config.max_iterations {
                let interrupted = tokio::select! {
                    _ = tokio::time::sleep(self.config.iteration_delay) => false,
                    _ = interrupt.triggered() => true,
                };
                if interrupted {
                    return self.interrupted(console, iteration);
                }
            }
        }

        let summary = ledger::summarize(&self.paths.ledger).unwrap_or(summary);
        self.status = LoopStatus::Exhausted;
        log::warn!(
            "Max iterations ({}) reached for {}",
            self.config.max_iterations,
            self.paths.selector
        );
        show(console, &display::exhausted(self.config.max_iterations, &summary));
        Ok(LoopOutcome::Exhausted {
            max_iterations: self.config.max_iterations,
            summary,
        })
    }

    fn summarize(&mut self) -> Result<LedgerSummary> {
        ledger::summarize(&self.paths.ledger).inspect_err(|e| {
            log::error!("Ledger unusable: {}", e);
            self.status = LoopStatus::FatalSetupError;
        })
    }

    fn interrupted(&mut self, console: &mut (dyn Write + Send), iteration: u32) -> Result<LoopOutcome> {
        self.status = LoopStatus::Interrupted;
        log::warn!("Interrupted during iteration {}", iteration);
        show(console, &display::interrupted(iteration));
        Ok(LoopOutcome::Interrupted { iteration })
    }
}

/// Progress output is best effort; a closed console never changes the outcome.
fn show(console: &mut (dyn Write + Send), text: &str) {
    if let Err(e) = console.write_all(text.as_bytes()).and_then(|_| console.flush()) {
        log::warn!("Console write failed: {}", e);
    }
}
