//! almd - single-file dependency manager
//!
//! almd lets a project declare named dependencies that each resolve to a
//! single file in a remote repository (currently GitHub), pinned to a
//! concrete commit and recorded in a lockfile for reproducible installs.
//!
//! # Architecture
//!
//! almd follows a manifest/lockfile model:
//! - `project.toml` declares dependencies as `name -> { source, path }`
//! - `almd-lock.toml` records the exact raw URL and integrity token that
//!   was installed, so a later `almd install` can converge to the same state
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface implementation
//! - [`core`] - Error types shared across the crate
//! - [`lockfile`] - Lockfile (`almd-lock.toml`) model and I/O
//! - [`manifest`] - Manifest (`project.toml`) model and I/O
//! - [`net`] - HTTP downloader with error classification
//! - [`ops`] - Reconciliation engine: `add`, `remove`, `install`
//! - [`resolver`] - Resolves symbolic refs to commit SHAs via the GitHub API
//! - [`source`] - Source string parsing and canonicalization
//! - [`utils`] - Filesystem helpers and content hashing
//!
//! # Example
//!
//! ```toml
//! # project.toml
//! [package]
//! name = "my-game"
//! version = "0.1.0"
//!
//! [dependencies.inspect]
//! source = "github:kikito/inspect.lua/inspect.lua@v3.1.1"
//! path = "src/lib/inspect.lua"
//! ```
//!
//! ```bash
//! almd add github:kikito/inspect.lua/inspect.lua@v3.1.1
//! almd install
//! almd list
//! ```

pub mod cli;
pub mod core;
pub mod lockfile;
pub mod manifest;
pub mod net;
pub mod ops;
pub mod resolver;
pub mod source;
pub mod utils;
