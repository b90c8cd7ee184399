//! tidycache: fingerprint-keyed result cache in front of clang-tidy.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use tidycache::cache;
use tidycache::cache::fs::FsStore;
use tidycache::config::Config;
use tidycache::constants;
use tidycache::env::Env;
use tidycache::orchestrator::{Orchestrator, OrchestratorError};
use tidycache::runner::RunError;

use cli::{CacheAction, Cli, Command};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Management commands are dispatched on the first argument; any other
    // argument vector is a clang-tidy invocation and is passed through
    // verbatim. The two can never collide because clang-tidy targets are
    // file paths.
    match args.first().map(String::as_str) {
        None | Some("cache") | Some("version") | Some("--help") | Some("-h") => {
            let cli = Cli::parse();
            match cli.command {
                Command::Cache { action } => run_cache(action),
                Command::Version => run_version(),
            }
        }
        _ => run_wrapped(args).await,
    }
}

/// Print version information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    Ok(())
}

/// Manage the local result cache.
fn run_cache(action: CacheAction) -> Result<()> {
    let config = Config::load(&Env::real()).context("failed to load configuration")?;
    let store = FsStore::new(config.cache.dir)?;

    match action {
        CacheAction::Clear => {
            let stats = store.clear().context("failed to clear cache")?;
            println!(
                "Cleared {} cached entry/entries ({}).",
                stats.entries,
                stats.human_size(),
            );
        }
        CacheAction::Stats => {
            let stats = store.stats().context("failed to read cache stats")?;
            println!("Cache entries: {}", stats.entries);
            println!("Cache size:    {}", stats.human_size());
        }
        CacheAction::Path => {
            println!("{}", store.path().display());
        }
    }

    Ok(())
}

/// Evaluate one wrapped clang-tidy invocation through the cache.
async fn run_wrapped(args: Vec<String>) -> Result<()> {
    let config = Config::load(&Env::real()).context("failed to load configuration")?;
    let working_dir =
        std::env::current_dir().context("failed to determine the working directory")?;

    let store = cache::from_config(&config).context("failed to initialise the cache backend")?;
    let orchestrator = Orchestrator::new(config, store);

    match orchestrator.evaluate(&working_dir, &args).await {
        Ok(_) => Ok(()),
        // The tool's diagnostics were already relayed; mirror its exit code
        Err(OrchestratorError::Run(RunError::Failed { status, .. })) => {
            process::exit(status.code().unwrap_or(1));
        }
        Err(e) => Err(e.into()),
    }
}
