//! Decision phase of a reconciliation pass.
//!
//! [`decide`] is the only place that answers "do we act?". It is a pure
//! function over the resolved target, the locked entry, and the observed
//! file state; the rules are evaluated in a fixed order and the first one
//! that fires names the reason. A dependency is up to date exactly when no
//! rule (other than the force override) fires.

use crate::lockfile::{PackageEntry, commit_sha_of, is_content_hash};
use crate::source::{ParsedSource, is_commit_sha, is_hexish_ref};
use std::fmt;

/// Observed state of a dependency's file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Present,
    Missing,
    /// The file could not be stat'ed for a reason other than absence.
    Unreadable,
}

/// Why an install action is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionReason {
    /// `--force` was given; overrides every other rule.
    Forced,
    /// No lockfile entry exists for the dependency.
    NotLocked,
    /// The installed file is missing from disk.
    FileMissing,
    /// The installed file could not be inspected.
    StatError,
    /// The resolved target commit differs from the locked commit.
    CommitMismatch,
    /// The target is a pinned commit but only a content hash is locked.
    HashTypeConflict,
}

impl fmt::Display for ActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Forced => "forced",
            Self::NotLocked => "not locked",
            Self::FileMissing => "file missing",
            Self::StatError => "file state unreadable",
            Self::CommitMismatch => "pinned commit changed",
            Self::HashTypeConflict => "lock has no commit pin",
        };
        f.write_str(text)
    }
}

/// Transient resolution state for one dependency in one pass.
///
/// Built during the resolution phase, consumed by [`decide`] and the
/// execution phase, never persisted.
#[derive(Debug, Clone)]
pub struct InstallState {
    pub name: String,
    pub parsed: ParsedSource,
    /// Raw URL an action would fetch; the ref segment is already replaced
    /// with the resolved SHA when resolution succeeded.
    pub target_raw_url: String,
    /// Resolved commit SHA, or the user's ref verbatim when resolution was
    /// skipped or failed.
    pub target_commit: String,
    /// Lockfile entry for this dependency, if one exists.
    pub locked: Option<PackageEntry>,
}

impl InstallState {
    /// The target commit SHA, when one is actually known: either the ref
    /// itself is (abbreviated) hex or the resolver pinned it.
    #[must_use]
    pub fn target_sha(&self) -> Option<&str> {
        if is_hexish_ref(&self.target_commit) {
            Some(&self.target_commit)
        } else {
            None
        }
    }
}

/// Evaluate the decision rules in order; the first that fires decides.
/// `None` means the dependency is up to date.
#[must_use]
pub fn decide(force: bool, file_state: FileState, state: &InstallState) -> Option<ActionReason> {
    if force {
        return Some(ActionReason::Forced);
    }

    let Some(locked) = &state.locked else {
        return Some(ActionReason::NotLocked);
    };

    match file_state {
        FileState::Missing => return Some(ActionReason::FileMissing),
        FileState::Unreadable => return Some(ActionReason::StatError),
        FileState::Present => {}
    }

    if let (Some(target_sha), Some(locked_sha)) = (state.target_sha(), commit_sha_of(&locked.hash))
    {
        if target_sha != locked_sha {
            return Some(ActionReason::CommitMismatch);
        }
    }

    if is_commit_sha(&state.target_commit) && is_content_hash(&locked.hash) {
        return Some(ActionReason::HashTypeConflict);
    }

    None
}
