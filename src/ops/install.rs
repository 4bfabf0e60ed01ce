//! The `install` operation: reconcile declared dependencies with the
//! lockfile and the files on disk.
//!
//! A pass runs three phases per target set:
//!
//! 1. **Resolution** - parse each declared source and, for symbolic refs on
//!    commit-addressable providers, pin them to a SHA via the remote API.
//! 2. **Decision** - [`crate::ops::plan::decide`] picks which dependencies
//!    need an action and why.
//! 3. **Execution** - download, hash, write, and upsert the in-memory
//!    lockfile entry.
//!
//! Per-dependency failures are isolated: they are reported and the pass
//! continues. The lockfile is loaded once up front and saved once at the
//! end, only when at least one action succeeded.

use crate::core::AlmdError;
use crate::lockfile::{Lockfile, commit_token};
use crate::manifest::{Dependency, Manifest};
use crate::net::{Downloader, http_client};
use crate::ops::plan::{FileState, InstallState, decide};
use crate::resolver::RefResolver;
use crate::source::{self, is_hexish_ref, raw_url_for};
use crate::utils::checksum::sha256_hash;
use crate::utils::fs::{ensure_dir, write_file_0644};
use crate::utils::warn_user;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Inputs for [`install`].
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// Dependencies to reconcile; empty means every manifest entry.
    pub names: Vec<String>,
    /// Reinstall regardless of current state.
    pub force: bool,
    /// HTTP timeout override.
    pub timeout: Option<Duration>,
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Actions that completed: downloaded, written, and locked.
    pub installed: usize,
    /// Targets that needed nothing.
    pub up_to_date: usize,
    /// Targets that failed to parse, download, or write.
    pub failed: usize,
}

/// Reconcile `root` against its manifest.
///
/// The decision rules fire in a fixed order per dependency; the first rule
/// that matches names the reason reported for the action:
///
/// | Rule | Reason |
/// |------|--------|
/// | `--force` given | `Forced` |
/// | no lockfile entry | `NotLocked` |
/// | file missing from disk | `FileMissing` / `StatError` |
/// | resolved SHA differs from locked `commit:` | `CommitMismatch` |
/// | target is a full SHA, lock is `sha256:` | `HashTypeConflict` |
///
/// # Errors
///
/// Returns an error for top-level problems (unreadable manifest or
/// lockfile, unknown names in `names`) and for the all-failed case: a pass
/// that had targets, performed no successful action, and hit at least one
/// failure. Partial failure with at least one success exits cleanly.
///
/// # Examples
///
/// ```rust,ignore
/// use almd::ops::{install, InstallRequest};
///
/// let report = install(project_root, InstallRequest::default()).await?;
/// println!("{} installed, {} already current", report.installed, report.up_to_date);
/// ```
pub async fn install(root: &Path, request: InstallRequest) -> Result<InstallReport> {
    let started = Instant::now();

    let manifest = Manifest::load(root)?;

    let targets: Vec<(String, Dependency)> = if request.names.is_empty() {
        manifest
            .dependencies
            .iter()
            .map(|(name, dep)| (name.clone(), dep.clone()))
            .collect()
    } else {
        let mut targets = Vec::with_capacity(request.names.len());
        for name in &request.names {
            match manifest.dependencies.get(name) {
                Some(dep) => targets.push((name.clone(), dep.clone())),
                None => {
                    return Err(AlmdError::DependencyNotFound { name: name.clone() }.into());
                }
            }
        }
        targets
    };

    for (first, second, path) in manifest.duplicate_paths() {
        warn_user(
            AlmdError::DuplicateDependency {
                first,
                second,
                path,
            }
            .to_string(),
        );
    }

    if targets.is_empty() {
        println!("No dependencies to install");
        return Ok(InstallReport::default());
    }

    let mut lockfile = match Lockfile::load(root) {
        Ok(lockfile) => lockfile,
        Err(AlmdError::LockfileNotFound { .. }) => Lockfile::new(),
        Err(e) => return Err(e.into()),
    };

    let downloader = Downloader::new(http_client(request.timeout)?);
    let resolver = RefResolver::new(downloader.client().clone());

    let mut report = InstallReport::default();

    // Resolution phase
    let mut states: Vec<(InstallState, Dependency)> = Vec::with_capacity(targets.len());
    for (name, dep) in targets {
        let parsed = match source::parse(&dep.source) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn_user(format!("skipping '{name}': {e}"));
                report.failed += 1;
                continue;
            }
        };

        let mut target_raw_url = parsed.raw_url.clone();
        let mut target_commit = parsed.reference.clone();
        if parsed.provider.has_commit_addressing() && !is_hexish_ref(&parsed.reference) {
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
                    target_raw_url =
                        raw_url_for(&parsed.owner, &parsed.repo, &sha, &parsed.path_in_repo);
                    target_commit = sha;
                }
                Err(e) => {
                    warn_user(format!(
                        "could not resolve ref '{}' for '{name}': {e}",
                        parsed.reference
                    ));
                }
            }
        }

        let locked = lockfile.get(&name).cloned();
        states.push((
            InstallState {
                name,
                parsed,
                target_raw_url,
                target_commit,
                locked,
            },
            dep,
        ));
    }

    // Decision + execution phases
    for (state, dep) in states {
        let file_abs = root.join(&dep.path);
        let file_state = match std::fs::metadata(&file_abs) {
            Ok(_) => FileState::Present,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileState::Missing,
            Err(_) => FileState::Unreadable,
        };

        let Some(reason) = decide(request.force, file_state, &state) else {
            tracing::debug!("'{}' is up to date", state.name);
            report.up_to_date += 1;
            continue;
        };
        tracing::info!("installing '{}': {reason}", state.name);

        let content = match downloader.fetch(&state.target_raw_url).await {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "{} failed to download '{}': {e}",
                    "Error:".red().bold(),
                    state.name
                );
                report.failed += 1;
                continue;
            }
        };

        let hash = if state.parsed.provider.has_commit_addressing()
            && is_hexish_ref(&state.target_commit)
        {
            commit_token(&state.target_commit)
        } else {
            sha256_hash(&content)
        };

        if let Some(parent) = file_abs.parent() {
            if let Err(e) = ensure_dir(parent) {
                eprintln!(
                    "{} failed to write '{}': {e:#}",
                    "Error:".red().bold(),
                    state.name
                );
                report.failed += 1;
                continue;
            }
        }
        if let Err(e) = write_file_0644(&file_abs, &content) {
            eprintln!(
                "{} failed to write '{}': {e}",
                "Error:".red().bold(),
                state.name
            );
            report.failed += 1;
            continue;
        }

        lockfile.add_or_update(&state.name, state.target_raw_url.clone(), dep.path, hash);
        println!("  {} {} ({reason})", "+".green(), state.name);
        report.installed += 1;
    }

    if report.installed > 0 {
        lockfile.save(root)?;
    }

    if report.installed == 0 && report.failed > 0 {
        return Err(anyhow::anyhow!(
            "no dependency could be installed ({} failed)",
            report.failed
        ));
    }

    println!(
        "{} Installed {} dependencies ({} up to date) in {:.2?}",
        "✓".green(),
        report.installed,
        report.up_to_date,
        started.elapsed()
    );
    Ok(report)
}
