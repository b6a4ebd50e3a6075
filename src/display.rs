//! Console formatting for loop progress.
//!
//! Everything here is a pure function from state to text; callers decide where
//! it is written.

use chrono::{DateTime, Local};
use colored::*;

use crate::error::WiggumError;
use crate::invoker::InvocationError;
use crate::ledger::{LedgerSummary, PendingItem};
use crate::runner::IterationState;

const RULE: &str = "═══════════════════════════════════════════════════════";

/// Banner printed before each invocation
pub fn iteration_banner(state: &IterationState, next: Option<&PendingItem>, started: DateTime<Local>) -> String {
    let mut out = format!(
        "\n{}\n{} {}/{}  {}\n",
        RULE.cyan(),
        "Iteration".bold().cyan(),
        state.iteration,
        state.max_iterations,
        started.format("%H:%M:%S").to_string().dimmed()
    );
    out.push_str(&format!(
        "  {} {} total, {} completed, {} remaining\n",
        "Items:".dimmed(),
        state.total,
        state.completed,
        state.remaining()
    ));
    if let Some(item) = next {
        out.push_str(&format!("  {}  [{}] {} {}\n", "Next:".dimmed(), item.category, item.id, item.title));
    }
    out.push_str(&format!("{}\n", RULE.cyan()));
    out
}

/// Note printed when an invocation did not finish cleanly
pub fn invocation_failed(iteration: u32, error: &InvocationError) -> String {
    format!(
        "{} iteration {}: {} (continuing)",
        "Agent error:".yellow().bold(),
        iteration,
        error
    )
}

/// Success summary
pub fn completed(iterations: u32, summary: &LedgerSummary) -> String {
    format!(
        "\n{}\n  {} of {} items passing after {} {}\n",
        "All work items complete!".green().bold(),
        summary.completed,
        summary.total,
        iterations,
        if iterations == 1 { "iteration" } else { "iterations" }
    )
}

/// Budget spent without a completion signal
pub fn exhausted(max_iterations: u32, summary: &LedgerSummary) -> String {
    format!(
        "\n{}\n  {} of {} items passing, {} remaining. Run again to continue.\n",
        format!("Max iterations ({}) reached without a completion signal.", max_iterations)
            .yellow()
            .bold(),
        summary.completed,
        summary.total,
        summary.remaining()
    )
}

/// Operator stopped the run
pub fn interrupted(iteration: u32) -> String {
    format!(
        "\n{} during iteration {}. Run again to continue.\n",
        "Interrupted".yellow().bold(),
        iteration
    )
}

/// Error that stops the run, either before the first iteration or mid-run
pub fn fatal(error: &WiggumError) -> String {
    let label = if error.is_ledger_error() { "Ledger unusable:" } else { "Error:" };
    format!("{} {}", label.red().bold(), error)
}

/// Per-category counts for `--status`
pub fn ledger_status(selector: &str, summary: &LedgerSummary) -> String {
    let mut out = format!(
        "{} {}/{} completed, {} remaining\n",
        selector.bold(),
        summary.completed,
        summary.total,
        summary.remaining()
    );
    for group in &summary.groups {
        out.push_str(&format!(
            "  {:<13} {}/{}\n",
            group.category.label(),
            group.completed,
            group.total
        ));
    }
    if let Some(item) = &summary.next_pending {
        out.push_str(&format!("  next: [{}] {} {}\n", item.category, item.id, item.title));
    }
    out
}

/// One line of the `--list` output
pub fn selector_line(selector: &str, summary: Option<&LedgerSummary>) -> String {
    match summary {
        Some(summary) if summary.total > 0 && summary.remaining() == 0 => {
            format!("  {:<24} {}/{} {}", selector, summary.completed, summary.total, "done".green())
        }
        Some(summary) => format!("  {:<24} {}/{}", selector, summary.completed, summary.total),
        None => format!("  {:<24} {}", selector, "unreadable ledger".red()),
    }
}

/// Usage error shown when no selector was given
pub fn missing_selector(usage: &str, known: &[String]) -> String {
    let mut out = format!("{} missing work group selector\n\n{}\n", "error:".red().bold(), usage);
    if known.is_empty() {
        out.push_str("\nNo work groups found.\n");
    } else {
        out.push_str("\nKnown work groups:\n");
        for selector in known {
            out.push_str(&format!("  {}\n", selector));
        }
    }
    out
}
