//! Wiggum - an autonomous iteration controller for coding agents
//!
//! Wiggum implements the "Ralph Wiggum" pattern: invoke an agent with fresh
//! context against a work ledger, over and over, until the agent declares the
//! work done or the iteration budget runs out.

pub mod cli;
pub mod config;
pub mod detector;
pub mod display;
pub mod error;
pub mod invoker;
pub mod ledger;
pub mod runner;
pub mod workspace;

pub use error::{Result, WiggumError};
