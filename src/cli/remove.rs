//! Remove a dependency from the project.

use crate::ops;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// `almd remove <name>`
#[derive(Args)]
pub struct RemoveCommand {
    /// Name of the dependency to remove
    pub(crate) name: String,
}

impl RemoveCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        ops::remove(root, &self.name)
    }
}
