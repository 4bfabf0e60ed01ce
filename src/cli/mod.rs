//! Command-line interface for almd.
//!
//! Each command lives in its own module with its own argument struct and
//! execution logic. All commands operate on the project in the current
//! working directory.
//!
//! ```bash
//! almd init
//! almd add github:rxi/json.lua/json.lua@v0.1.2
//! almd install --force
//! almd remove json
//! almd list
//! ```

mod add;
mod init;
mod install;
mod list;
mod remove;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Top-level CLI: global flags plus one subcommand.
#[derive(Parser)]
#[command(
    name = "almd",
    about = "Single-file dependency manager",
    version,
    long_about = "almd pins individual files from remote repositories to exact commits, \
                  tracked in project.toml and almd-lock.toml."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter project.toml in the current directory
    Init(init::InitCommand),

    /// Download a file and record it as a dependency
    Add(add::AddCommand),

    /// Remove a dependency and clean up its file
    Remove(remove::RemoveCommand),

    /// Install dependencies to match the manifest
    Install(install::InstallCommand),

    /// Show declared dependencies and their lock status
    List(list::ListCommand),
}

impl Cli {
    /// Whether `--verbose` was given; consulted by `main` for log setup.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Dispatch to the selected command against the current directory.
    pub async fn execute(self) -> Result<()> {
        let root = std::env::current_dir()?;
        match self.command {
            Commands::Init(cmd) => cmd.execute(&root),
            Commands::Add(cmd) => cmd.execute(&root).await,
            Commands::Remove(cmd) => cmd.execute(&root),
            Commands::Install(cmd) => cmd.execute(&root).await,
            Commands::List(cmd) => cmd.execute(&root),
        }
    }
}
