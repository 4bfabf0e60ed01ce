//! Integration test suite.
//!
//! - `scenarios` drives the library operations end to end against local
//!   HTTP fixtures standing in for the GitHub API and raw host.
//! - `cli` exercises the compiled binary's surface: exit codes and the
//!   `Error:` contract on stderr.
//! - `properties` checks cross-cutting invariants over generated inputs.

mod cli;
mod scenarios;
