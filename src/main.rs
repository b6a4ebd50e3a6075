use clap::{CommandFactory, Parser};
use colored::*;
use eyre::{Context, Result};
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use wiggum::cli::Cli;
use wiggum::config::Config;
use wiggum::detector::CompletionDetector;
use wiggum::display;
use wiggum::invoker::ProcessInvoker;
use wiggum::ledger;
use wiggum::runner::{IterationLoop, LoopConfig, interrupt_channel};
use wiggum::workspace::{WorkPaths, discover_selectors};

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wiggum")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("wiggum.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn handle_list(config: &Config) -> ExitCode {
    let selectors = discover_selectors(&config.work_root, &config.files.ledger);
    if selectors.is_empty() {
        println!("No work groups found under {}", config.work_root.display());
        return ExitCode::SUCCESS;
    }

    println!("{} {}", "Work groups in".cyan(), config.work_root.display());
    for selector in &selectors {
        let summary = WorkPaths::resolve(&config.work_root, selector, &config.files)
            .and_then(|paths| ledger::summarize(&paths.ledger))
            .ok();
        println!("{}", display::selector_line(selector, summary.as_ref()));
    }
    ExitCode::SUCCESS
}

fn handle_status(paths: &WorkPaths) -> ExitCode {
    match ledger::summarize(&paths.ledger) {
        Ok(summary) => {
            print!("{}", display::ledger_status(&paths.selector, &summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", display::fatal(&e));
            ExitCode::FAILURE
        }
    }
}

async fn handle_run(cli: &Cli, config: &Config, paths: WorkPaths) -> ExitCode {
    let mut loop_config = LoopConfig::from(&config.run);
    if let Some(max) = cli.max_iterations {
        loop_config.max_iterations = max;
    }

    if cli.is_verbose() {
        println!("{} {}", "Ledger:".cyan(), paths.ledger.display());
        println!("{} {} {}", "Agent:".cyan(), config.agent.command, config.agent.args.join(" "));
    }

    let invoker = Arc::new(ProcessInvoker::from_config(&config.agent));
    let detector = CompletionDetector::new(config.sentinel.clone());
    let mut runner = IterationLoop::new(invoker, detector, paths, loop_config);

    let (handle, signal) = interrupt_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.trigger();
        }
    });

    let mut stdout = std::io::stdout();
    let result = runner.run(&mut stdout, signal).await;
    match result {
        Ok(outcome) => {
            info!("Run finished: {:?} after {} invocations", outcome.status(), runner.invocations());
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            eprintln!("{}", display::fatal(&e));
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    if let Some(root) = &cli.root {
        config.work_root = root.clone();
    }
    config.validate().context("Invalid configuration")?;

    if cli.list {
        return Ok(handle_list(&config));
    }

    let Some(selector) = cli.selector.as_deref() else {
        let known = discover_selectors(&config.work_root, &config.files.ledger);
        let usage = Cli::command().render_usage().to_string();
        eprint!("{}", display::missing_selector(&usage, &known));
        return Ok(ExitCode::FAILURE);
    };

    let paths = match WorkPaths::resolve(&config.work_root, selector, &config.files) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.status {
        return Ok(handle_status(&paths));
    }

    Ok(handle_run(&cli, &config, paths).await)
}
