//! Render manifest and lockfile status.

use crate::core::AlmdError;
use crate::lockfile::{Lockfile, commit_sha_of, is_content_hash};
use crate::manifest::Manifest;
use crate::utils::warn_user;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// `almd list`
#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn execute(self, root: &Path) -> Result<()> {
        let manifest = Manifest::load(root)?;

        // A broken lockfile should not stop a status listing.
        let lockfile = match Lockfile::load(root) {
            Ok(lockfile) => lockfile,
            Err(AlmdError::LockfileNotFound { .. }) => Lockfile::new(),
            Err(e) => {
                warn_user(e.to_string());
                Lockfile::new()
            }
        };

        if manifest.dependencies.is_empty() {
            println!("No dependencies declared in project.toml");
            return Ok(());
        }

        for (name, dep) in &manifest.dependencies {
            let lock_status = match lockfile.get(name) {
                Some(entry) => describe_hash(&entry.hash),
                None => "not locked".yellow().to_string(),
            };
            let file_status = if root.join(&dep.path).exists() {
                "present".green().to_string()
            } else {
                "missing".red().to_string()
            };
            println!("{} {}", name.bold(), dep.source);
            println!("    {} [{lock_status}, file {file_status}]", dep.path);
        }

        Ok(())
    }
}

/// Short human form of an integrity token.
fn describe_hash(hash: &str) -> String {
    if let Some(sha) = commit_sha_of(hash) {
        let short: String = sha.chars().take(7).collect();
        format!("commit {short}")
    } else if is_content_hash(hash) {
        "content hash".to_string()
    } else {
        format!("unrecognized hash '{hash}'")
    }
}
