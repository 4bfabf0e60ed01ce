//! The `remove` operation: drop a dependency from the manifest, then
//! best-effort cleanup of the file, empty parent directories, and the
//! lockfile entry.
//!
//! Once the manifest edit has been saved the command cannot fail: every
//! later problem is reported as a warning and the exit code stays zero.

use crate::core::AlmdError;
use crate::lockfile::Lockfile;
use crate::manifest::Manifest;
use crate::utils::fs::prune_empty_dirs_upward;
use crate::utils::warn_user;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::time::Instant;

/// Remove the dependency `name` from the project in `root`.
pub fn remove(root: &Path, name: &str) -> Result<()> {
    let started = Instant::now();

    let mut manifest = Manifest::load(root)?;
    if manifest.dependencies.is_empty() {
        return Err(AlmdError::NoDependencies.into());
    }
    let Some(entry) = manifest.remove_dependency(name) else {
        return Err(AlmdError::DependencyNotFound {
            name: name.to_string(),
        }
        .into());
    };
    manifest.save(root)?;

    // The manifest edit is committed; everything below is warning-only.
    let file_abs = root.join(&entry.path);
    match std::fs::remove_file(&file_abs) {
        Ok(()) => {
            tracing::debug!("deleted {}", file_abs.display());
            if let Some(parent) = file_abs.parent() {
                let (removed, err) = prune_empty_dirs_upward(parent, root);
                for dir in &removed {
                    tracing::debug!("removed empty directory {}", dir.display());
                }
                if let Some(e) = err {
                    warn_user(format!("stopped pruning empty directories: {e}"));
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn_user(format!("could not delete {}: {e}", file_abs.display())),
    }

    match Lockfile::load(root) {
        Ok(mut lockfile) => {
            if lockfile.remove(name).is_some() {
                if let Err(e) = lockfile.save(root) {
                    warn_user(format!("could not update lockfile: {e:#}"));
                }
            }
        }
        Err(AlmdError::LockfileNotFound { .. }) => {}
        Err(e) => warn_user(format!("could not read lockfile: {e}")),
    }

    println!(
        "{} Removed 1 dependency: '{name}' in {:.2?}",
        "✓".green(),
        started.elapsed()
    );
    Ok(())
}
