//! almd CLI entry point
//!
//! Parses command-line arguments, configures logging, executes the chosen
//! command, and renders any failure as a single `Error:` line on stderr
//! with a non-zero exit code.

use almd::cli;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Logging rules:
    // 1. RUST_LOG set - use it regardless of --verbose
    // 2. RUST_LOG unset and --verbose set - debug level
    // 3. RUST_LOG unset and --verbose unset - no logging
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if cli.verbose() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            std::process::exit(1);
        }
    }
}
