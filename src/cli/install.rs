//! Install dependencies to match the manifest.

use crate::ops::{self, InstallRequest};
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// `almd install [names…] [--force]`
#[derive(Args)]
pub struct InstallCommand {
    /// Dependencies to install; all of them when omitted
    pub(crate) names: Vec<String>,

    /// Reinstall even when already up to date
    #[arg(long)]
    pub(crate) force: bool,
}

impl InstallCommand {
    pub async fn execute(self, root: &Path) -> Result<()> {
        ops::install(
            root,
            InstallRequest {
                names: self.names,
                force: self.force,
                timeout: None,
            },
        )
        .await?;
        Ok(())
    }
}
