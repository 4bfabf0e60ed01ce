//! Manifest loading and saving.

use crate::core::AlmdError;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::path::Path;

use super::Manifest;

/// Manifest filename at the project root.
pub const MANIFEST_FILE: &str = "project.toml";

impl Manifest {
    /// Load the manifest from `dir`.
    ///
    /// A missing file is [`AlmdError::ManifestNotFound`]; callers branch on
    /// it because several commands want to suggest `almd init`.
    pub fn load(dir: &Path) -> Result<Self, AlmdError> {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AlmdError::ManifestNotFound {
                    dir: dir.display().to_string(),
                }
            } else {
                AlmdError::file_io(path.display().to_string(), e)
            }
        })?;

        toml::from_str(&content).map_err(|e| AlmdError::ManifestParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Save the manifest to `dir` atomically (write-temp-then-rename).
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let content = toml::to_string_pretty(self)
            .with_context(|| format!("Failed to serialize manifest for {}", path.display()))?;
        atomic_write(&path, content.as_bytes())
            .with_context(|| format!("Cannot write manifest: {}", path.display()))
    }
}
