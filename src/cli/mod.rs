//! CLI module for wiggum - command-line interface.
//!
//! A single command: run the loop for a work group, or inspect work groups
//! with `--list` / `--status`.

pub mod commands;

pub use commands::Cli;
