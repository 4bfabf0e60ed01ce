//! Lockfile (`almd-lock.toml`) model and mutation.
//!
//! The lockfile is not a cache: it is the authoritative record of what was
//! actually installed. Each entry stores the concrete raw URL that was
//! fetched (with the ref substituted for a commit SHA when resolution
//! succeeded) and an integrity token:
//!
//! - `commit:<40-hex-sha>` when a commit SHA pinned the content
//! - `sha256:<64-hex>` as the fallback when no SHA was available
//!
//! ```toml
//! api_version = "1"
//!
//! [package.inspect]
//! source = "https://raw.githubusercontent.com/kikito/inspect.lua/8686162/inspect.lua"
//! path = "src/lib/inspect.lua"
//! hash = "commit:86861624ccd17e07c8a05a75520c0a1cd8b1c0a1"
//! ```

mod io;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use io::LOCKFILE_FILE;

/// Current lockfile schema version.
pub const API_VERSION: &str = "1";

/// One resolved, installed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Concrete raw URL that was fetched.
    pub source: String,
    /// Forward-slash path relative to the project root, as of locking.
    pub path: String,
    /// Integrity token, always prefixed with its algorithm.
    pub hash: String,
}

/// The complete `almd-lock.toml` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lockfile {
    pub api_version: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package: BTreeMap<String, PackageEntry>,
}

impl Default for Lockfile {
    fn default() -> Self {
        Self::new()
    }
}

impl Lockfile {
    /// An empty lockfile at the current schema version. Callers construct
    /// this when [`Lockfile::load`] reports the file missing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            package: BTreeMap::new(),
        }
    }

    /// Insert or replace the entry for `name`.
    pub fn add_or_update(&mut self, name: &str, source: String, path: String, hash: String) {
        self.package
            .insert(name.to_string(), PackageEntry { source, path, hash });
    }

    /// Remove the entry for `name`. No-op when absent.
    pub fn remove(&mut self, name: &str) -> Option<PackageEntry> {
        self.package.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageEntry> {
        self.package.get(name)
    }
}

/// Format a commit integrity token.
///
/// # Examples
///
/// ```
/// use almd::lockfile::{commit_token, commit_sha_of};
///
/// let token = commit_token("86861624ccd17e07c8a05a75520c0a1cd8b1c0a1");
/// assert_eq!(token, "commit:86861624ccd17e07c8a05a75520c0a1cd8b1c0a1");
/// assert_eq!(
///     commit_sha_of(&token),
///     Some("86861624ccd17e07c8a05a75520c0a1cd8b1c0a1")
/// );
/// ```
#[must_use]
pub fn commit_token(sha: &str) -> String {
    format!("commit:{sha}")
}

/// The SHA payload of a `commit:` token, if that is what `hash` is.
#[must_use]
pub fn commit_sha_of(hash: &str) -> Option<&str> {
    hash.strip_prefix("commit:")
}

/// Whether `hash` is a `sha256:` content token.
#[must_use]
pub fn is_content_hash(hash: &str) -> bool {
    hash.starts_with("sha256:")
}
