//! Add a dependency to the project.

use crate::ops::{self, AddRequest};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

/// `almd add <source> [-d dir] [-n name]`
#[derive(Args)]
pub struct AddCommand {
    /// Source: `github:owner/repo/path@ref`, a raw.githubusercontent.com
    /// URL, or a github.com file URL
    pub(crate) source: String,

    /// Directory to place the file in, relative to the project root
    /// (default: src/lib)
    #[arg(short = 'd', long = "dir")]
    pub(crate) dir: Option<PathBuf>,

    /// Dependency name override (the file keeps its original extension)
    #[arg(short = 'n', long = "name")]
    pub(crate) name: Option<String>,
}

impl AddCommand {
    pub async fn execute(self, root: &Path) -> Result<()> {
        ops::add(
            root,
            AddRequest {
                source: self.source,
                target_dir: self.dir,
                name_override: self.name,
                timeout: None,
            },
        )
        .await?;
        Ok(())
    }
}
