//! Runner module - drives the agent over one work group.
//!
//! This module provides the control loop, including:
//! - IterationLoop for running the agent until completion or exhaustion
//! - LoopOutcome / LoopStatus for representing where a run ended
//! - InterruptSignal for stopping a run from Ctrl-C

mod interrupt;
mod iteration_loop;
mod state;

pub use interrupt::{InterruptHandle, InterruptSignal, interrupt_channel};
pub use iteration_loop::{IterationLoop, LoopConfig};
pub use state::{IterationState, LoopOutcome, LoopStatus};
