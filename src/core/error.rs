//! Error handling for almd
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can branch on specific failure
//!    modes (e.g. a missing lockfile is recoverable, a corrupt one is not)
//! 2. **User-facing messages** that read well after the CLI's `Error:` prefix
//!
//! Operations that need to distinguish failure modes return
//! `Result<T, AlmdError>` directly; higher-level orchestration code bridges
//! into [`anyhow::Result`] with added context.

use thiserror::Error;

/// The main error type for almd operations.
///
/// Network and HTTP variants carry the URL they were issued against; file
/// variants carry the underlying [`std::io::Error`] as their source so the
/// OS-level reason stays visible in the error chain.
#[derive(Error, Debug)]
pub enum AlmdError {
    /// A source string could not be parsed into any supported dialect.
    #[error("invalid source '{input}': {reason}")]
    BadSource { input: String, reason: String },

    /// Transport-level failure: DNS, connection, TLS, or timeout.
    #[error("network error while requesting {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status other than 200 OK.
    #[error("unexpected HTTP status {code} from {url}")]
    HttpStatus { url: String, code: u16 },

    /// The response body could not be read to completion.
    #[error("failed to read response body from {url}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote API answered 200 but the payload was not what we expect.
    #[error("malformed response from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The commits API returned an empty list for the given ref and path.
    #[error("no commit found for ref '{reference}' touching '{path}' in {owner}/{repo}")]
    NoSuchCommit {
        owner: String,
        repo: String,
        path: String,
        reference: String,
    },

    /// A filesystem operation failed.
    #[error("file operation failed on {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No `project.toml` in the project directory.
    #[error("manifest file project.toml not found in {dir} (run 'almd init' first)")]
    ManifestNotFound { dir: String },

    /// Invalid TOML or invalid structure in the manifest.
    #[error("invalid manifest file {file}: {reason}")]
    ManifestParse { file: String, reason: String },

    /// No `almd-lock.toml` in the project directory. Callers that can
    /// proceed from an empty lockfile construct one instead of failing.
    #[error("lockfile almd-lock.toml not found in {dir}")]
    LockfileNotFound { dir: String },

    /// Invalid TOML or invalid structure in the lockfile.
    #[error("invalid lockfile {file}: {reason}")]
    LockfileCorrupt { file: String, reason: String },

    /// The named dependency does not exist in the manifest.
    #[error("dependency '{name}' not found in project.toml")]
    DependencyNotFound { name: String },

    /// The manifest has no dependencies at all.
    #[error("project.toml declares no dependencies")]
    NoDependencies,

    /// Two manifest entries claim the same destination path.
    #[error("dependencies '{first}' and '{second}' both install to '{path}'")]
    DuplicateDependency {
        first: String,
        second: String,
        path: String,
    },

    /// A dependency or file name that cannot be used on disk.
    #[error("invalid dependency name '{name}'")]
    InvalidName { name: String },

    /// A URL pointing at a host almd does not know how to fetch from.
    #[error("unsupported host '{host}' (only github.com sources are supported)")]
    UnsupportedHost { host: String },

    /// A GitHub `tree` URL names a directory, not a file.
    #[error("'{url}' points at a directory; almd manages single files")]
    UnsupportedTree { url: String },
}

impl AlmdError {
    /// File error constructor used wherever an `io::Error` needs its path
    /// attached before propagation.
    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }
}
