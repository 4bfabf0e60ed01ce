//! Reconciliation engine.
//!
//! Computes and executes the minimal set of install/update actions that
//! brings the workspace in line with the manifest, orchestrating the source
//! parser, ref resolver, downloader, hasher, and the two document stores.
//!
//! The decision of *whether* to act lives in [`plan`] as a pure function of
//! `(manifest, lockfile, filesystem state, remote state)`; [`add`],
//! [`remove`], and [`install`] perform the state transitions with their
//! respective cleanup semantics.

pub mod add;
pub mod install;
pub mod plan;
pub mod remove;

pub use add::{AddOutcome, AddRequest, DEFAULT_ADD_DIR, add};
pub use install::{InstallReport, InstallRequest, install};
pub use plan::{ActionReason, FileState, InstallState, decide};
pub use remove::remove;
