//! Lockfile loading and saving.

use crate::core::AlmdError;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::path::Path;

use super::{API_VERSION, Lockfile};

/// Lockfile filename at the project root.
pub const LOCKFILE_FILE: &str = "almd-lock.toml";

impl Lockfile {
    /// Load the lockfile from `dir`.
    ///
    /// A missing file is reported as [`AlmdError::LockfileNotFound`];
    /// callers that can proceed from an empty lockfile construct
    /// [`Lockfile::new`] instead of treating that as fatal.
    pub fn load(dir: &Path) -> Result<Self, AlmdError> {
        let path = dir.join(LOCKFILE_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AlmdError::LockfileNotFound {
                    dir: dir.display().to_string(),
                }
            } else {
                AlmdError::file_io(path.display().to_string(), e)
            }
        })?;

        toml::from_str(&content).map_err(|e| AlmdError::LockfileCorrupt {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Save the lockfile to `dir` atomically.
    ///
    /// The schema version is stamped before writing if it was left unset.
    pub fn save(&mut self, dir: &Path) -> Result<()> {
        if self.api_version.is_empty() {
            self.api_version = API_VERSION.to_string();
        }
        let path = dir.join(LOCKFILE_FILE);
        let content = toml::to_string_pretty(self)
            .with_context(|| format!("Failed to serialize lockfile for {}", path.display()))?;
        atomic_write(&path, content.as_bytes())
            .with_context(|| format!("Cannot write lockfile: {}", path.display()))
    }
}
