//! Create a starter manifest.

use crate::manifest::MANIFEST_FILE;
use crate::utils::fs::atomic_write;
use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// `almd init`
#[derive(Args)]
pub struct InitCommand {
    /// Overwrite an existing project.toml
    #[arg(long)]
    pub(crate) force: bool,
}

impl InitCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        let manifest_path = root.join(MANIFEST_FILE);
        if manifest_path.exists() && !self.force {
            bail!("{MANIFEST_FILE} already exists (use --force to overwrite)");
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "my-project".to_string());

        let content = format!(
            "[package]\n\
             name = \"{name}\"\n\
             version = \"0.1.0\"\n\
             \n\
             # Declare scripts here, e.g.:\n\
             # [scripts]\n\
             # run = \"love .\"\n\
             \n\
             # Dependencies are managed with 'almd add <source>'\n"
        );
        atomic_write(&manifest_path, content.as_bytes())?;

        println!("{} Created {MANIFEST_FILE}", "✓".green());
        Ok(())
    }
}
