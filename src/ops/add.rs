//! The `add` operation: fetch a new dependency, write it to disk, and
//! record it in the manifest and lockfile.
//!
//! Ordering matters: the file is downloaded and written first, then the
//! manifest, then the lockfile. A scoped guard deletes the written file if
//! any later step fails. The one asymmetric case is a manifest save that
//! succeeds followed by a lockfile failure: the manifest edit stays, and
//! the next `install` run re-establishes lock consistency.

use crate::core::AlmdError;
use crate::lockfile::{Lockfile, commit_token};
use crate::manifest::Manifest;
use crate::net::{Downloader, http_client};
use crate::resolver::RefResolver;
use crate::source::{self, ParsedSource, is_commit_sha, raw_url_for};
use crate::utils::checksum::sha256_hash;
use crate::utils::fs::{ensure_dir, normalize_path_for_storage, write_file_0644};
use crate::utils::warn_user;
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Where `add` puts files when no directory is given.
pub const DEFAULT_ADD_DIR: &str = "src/lib";

/// Inputs for [`add`].
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    /// Source string in any supported dialect.
    pub source: String,
    /// Target directory relative to the project root; defaults to
    /// [`DEFAULT_ADD_DIR`].
    pub target_dir: Option<PathBuf>,
    /// Overrides the dependency name (and the file stem on disk).
    pub name_override: Option<String>,
    /// HTTP timeout override.
    pub timeout: Option<Duration>,
}

/// What [`add`] recorded, for callers and tests.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub name: String,
    /// Forward-slash path relative to the project root.
    pub path: String,
    /// Integrity token stored in the lockfile.
    pub hash: String,
    /// Raw URL stored in the lockfile.
    pub locked_source: String,
}

/// Deletes a freshly written dependency file on unwind unless disarmed.
/// Deletion failure is only worth a warning: the file is orphaned, not
/// harmful.
struct WrittenFileGuard {
    path: PathBuf,
    armed: bool,
}

impl WrittenFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for WrittenFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn_user(format!(
                    "could not clean up {}: {e}",
                    self.path.display()
                ));
            }
        }
    }
}

/// Add a dependency to the project in `root`.
pub async fn add(root: &Path, request: AddRequest) -> Result<AddOutcome> {
    let started = Instant::now();

    let parsed = source::parse(&request.source)?;

    let downloader = Downloader::new(http_client(request.timeout)?);
    let content = downloader.fetch(&parsed.raw_url).await?;

    let (dep_name, file_on_disk) = derive_names(&parsed, request.name_override.as_deref())?;

    let rel_dir = request
        .target_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ADD_DIR));
    // An absolute target inside the project is tolerated and relativized.
    let rel_dir = match rel_dir.strip_prefix(root) {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => rel_dir.clone(),
    };

    let dest_dir = root.join(&rel_dir);
    ensure_dir(&dest_dir)?;
    let dest_file = dest_dir.join(&file_on_disk);
    write_file_0644(&dest_file, &content)
        .map_err(|e| AlmdError::file_io(dest_file.display().to_string(), e))?;
    let mut guard = WrittenFileGuard::new(dest_file);

    let resolver = RefResolver::new(downloader.client().clone());
    let (hash, locked_source) = integrity_for_add(&parsed, &content, &resolver).await;

    let rel_path = normalize_path_for_storage(&rel_dir.join(&file_on_disk));

    let mut manifest = Manifest::load(root)?;
    manifest.upsert_dependency(&dep_name, parsed.canonical_url.clone(), rel_path.clone());
    manifest.save(root)?;

    let mut lockfile = match Lockfile::load(root) {
        Ok(lockfile) => lockfile,
        Err(AlmdError::LockfileNotFound { .. }) => Lockfile::new(),
        Err(e) => return Err(e.into()),
    };
    lockfile.add_or_update(
        &dep_name,
        locked_source.clone(),
        rel_path.clone(),
        hash.clone(),
    );
    lockfile.save(root)?;

    guard.disarm();

    println!(
        "{} Added 1 dependency: '{dep_name}' -> {rel_path} in {:.2?}",
        "✓".green(),
        started.elapsed()
    );

    Ok(AddOutcome {
        name: dep_name,
        path: rel_path,
        hash,
        locked_source,
    })
}

/// Integrity token and lockfile source URL for a freshly added dependency.
///
/// A full-SHA ref pins directly. A symbolic ref on a commit-addressable
/// provider is resolved; on success both the token and the URL carry the
/// SHA. Anything else locks the content hash and the URL as fetched.
async fn integrity_for_add(
    parsed: &ParsedSource,
    content: &[u8],
    resolver: &RefResolver,
) -> (String, String) {
    if parsed.provider.has_commit_addressing() {
        if is_commit_sha(&parsed.reference) {
            return (commit_token(&parsed.reference), parsed.raw_url.clone());
        }
        match resolver
            .latest_commit_sha(
                &parsed.owner,
                &parsed.repo,
                &parsed.path_in_repo,
                &parsed.reference,
            )
            .await
        {
            Ok(sha) => {
                let url = raw_url_for(&parsed.owner, &parsed.repo, &sha, &parsed.path_in_repo);
                return (commit_token(&sha), url);
            }
            Err(e) => {
                warn_user(format!(
                    "could not pin ref '{}' to a commit, locking content hash instead: {e}",
                    parsed.reference
                ));
            }
        }
    }
    (sha256_hash(content), parsed.raw_url.clone())
}

/// Derive the dependency name and on-disk filename.
///
/// Without an override both come from the suggested filename (the name
/// drops the extension). With an override, the override becomes the name
/// and the file keeps the original extension.
fn derive_names(
    parsed: &ParsedSource,
    name_override: Option<&str>,
) -> Result<(String, String), AlmdError> {
    let suggested = Path::new(&parsed.suggested_filename);
    let stem = suggested
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = suggested
        .extension()
        .map(|s| s.to_string_lossy().into_owned());

    let dep_name = match name_override {
        Some(name) => name.to_string(),
        None => stem,
    };
    validate_name(&dep_name)?;

    let file_on_disk = match (name_override, &extension) {
        (Some(name), Some(ext)) => format!("{name}.{ext}"),
        (Some(name), None) => name.to_string(),
        (None, _) => parsed.suggested_filename.clone(),
    };
    validate_name(&file_on_disk)?;

    Ok((dep_name, file_on_disk))
}

fn validate_name(name: &str) -> Result<(), AlmdError> {
    if name.is_empty() || name == "." || name.contains('/') || name.contains('\\') {
        return Err(AlmdError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
