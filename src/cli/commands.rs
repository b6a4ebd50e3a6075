//! CLI definition using clap.
//!
//! `wiggum <SELECTOR> [MAX_ITERATIONS]` runs the loop; `--list` and `--status`
//! inspect work groups without invoking the agent.

use clap::Parser;
use std::path::PathBuf;

/// Wiggum - run a coding agent in a loop until the work ledger is done
#[derive(Parser, Debug)]
#[command(name = "wiggum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Work group to process (a directory under the work root)
    pub selector: Option<String>,

    /// Maximum iterations for this run
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: Option<u32>,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the work groups
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// List known work groups and exit
    #[arg(short, long, conflicts_with_all = ["status", "max_iterations"])]
    pub list: bool,

    /// Show the ledger summary for the work group and exit
    #[arg(short, long, requires = "selector")]
    pub status: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["wiggum"]).unwrap();
        assert!(cli.selector.is_none());
        assert!(cli.max_iterations.is_none());
        assert!(!cli.list);
        assert!(!cli.status);
        assert!(!cli.is_verbose());
    }

    #[test]
    fn test_cli_selector_only() {
        let cli = Cli::try_parse_from(["wiggum", "auth"]).unwrap();
        assert_eq!(cli.selector.as_deref(), Some("auth"));
        assert!(cli.max_iterations.is_none());
    }

    #[test]
    fn test_cli_selector_and_max_iterations() {
        let cli = Cli::try_parse_from(["wiggum", "auth", "25"]).unwrap();
        assert_eq!(cli.selector.as_deref(), Some("auth"));
        assert_eq!(cli.max_iterations, Some(25));
    }

    #[test]
    fn test_cli_rejects_zero_iterations() {
        assert!(Cli::try_parse_from(["wiggum", "auth", "0"]).is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_iterations() {
        assert!(Cli::try_parse_from(["wiggum", "auth", "many"]).is_err());
        assert!(Cli::try_parse_from(["wiggum", "auth", "-3"]).is_err());
    }

    #[test]
    fn test_cli_config_and_root() {
        let cli = Cli::try_parse_from(["wiggum", "-c", "/etc/wiggum.yml", "--root", "plans", "auth"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/wiggum.yml")));
        assert_eq!(cli.root, Some(PathBuf::from("plans")));
    }

    #[test]
    fn test_cli_list() {
        let cli = Cli::try_parse_from(["wiggum", "--list"]).unwrap();
        assert!(cli.list);
    }

    #[test]
    fn test_cli_status_requires_selector() {
        assert!(Cli::try_parse_from(["wiggum", "--status"]).is_err());
        let cli = Cli::try_parse_from(["wiggum", "-s", "auth"]).unwrap();
        assert!(cli.status);
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["wiggum", "-v", "auth"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
