//! File system utilities
//!
//! Safe, atomic file operations that behave the same on Windows, macOS, and
//! Linux. Persisted documents always store forward-slash paths; conversion
//! happens here at the storage boundary.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Ensure a directory exists, creating it and all parents if necessary.
///
/// Returns an error if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "Path exists but is not a directory: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Write a file atomically: write to a sibling temp file, sync, then rename.
///
/// The target is never observable in a partially written state, even if the
/// process dies mid-write. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Write a downloaded dependency file with mode 0644.
///
/// On non-Unix platforms the mode is whatever the platform default is.
pub fn write_file_0644(path: &Path, content: &[u8]) -> std::io::Result<()> {
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    }
    Ok(())
}

/// Render a path for storage in the manifest or lockfile.
///
/// Persisted paths contain only forward slashes regardless of the host OS.
#[must_use]
pub fn normalize_path_for_storage(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            // Parent components and roots are kept verbatim so a bad input
            // stays visible instead of silently collapsing.
            other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }
    parts.join("/")
}

/// Remove empty directories walking upward from `start`, stopping at
/// `root`, at `.`, or at the first non-empty directory.
///
/// Returns the directories that were removed, in removal order. The first
/// removal error ends the walk; the error is returned along with whatever
/// was already pruned so the caller can warn without aborting.
pub fn prune_empty_dirs_upward(start: &Path, root: &Path) -> (Vec<PathBuf>, Option<std::io::Error>) {
    let mut removed = Vec::new();
    let mut current = start.to_path_buf();

    loop {
        if current == root || current.as_os_str().is_empty() || current == Path::new(".") {
            break;
        }
        match fs::read_dir(&current) {
            Ok(mut entries) => {
                if entries.next().is_some() {
                    break;
                }
            }
            Err(e) => return (removed, Some(e)),
        }
        if let Err(e) = fs::remove_dir(&current) {
            return (removed, Some(e));
        }
        removed.push(current.clone());
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    (removed, None)
}
