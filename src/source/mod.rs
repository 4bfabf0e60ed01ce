//! Source string parsing and canonicalization.
//!
//! A source names a single file in a remote repository. Three dialects are
//! accepted and all collapse into the same canonical shorthand:
//!
//! - Shorthand: `github:owner/repo/path/to/file.lua@ref`
//! - Raw content URL: `https://raw.githubusercontent.com/owner/repo/ref/path`
//! - Repository URL: `https://github.com/owner/repo/blob/ref/path`,
//!   `.../raw/ref/path`, or `https://github.com/owner/repo/path@ref`
//!
//! Two sources that address the same file at the same ref always produce a
//! byte-equal `canonical_url`; that string is the stable key stored in the
//! manifest. Raw download URLs are rebuilt from parsed components whenever
//! a ref is substituted, never by textual replacement in an existing URL.

use crate::core::AlmdError;
use regex::Regex;
use std::sync::OnceLock;

/// Hosting provider a source was parsed from.
///
/// Only GitHub sources parse today; `Raw` is the designated slot for direct
/// CDN URLs with no ref semantics. The integrity-token policy branches on
/// this: providers without commit addressing always lock content hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    Raw,
}

impl Provider {
    /// Whether the provider can address revisions by commit SHA.
    #[must_use]
    pub fn has_commit_addressing(self) -> bool {
        matches!(self, Self::GitHub)
    }
}

/// A source string parsed into structured fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    pub provider: Provider,
    pub owner: String,
    pub repo: String,
    /// Forward-slash path of the file inside the repository.
    pub path_in_repo: String,
    /// Ref exactly as the user gave it: branch, tag, or commit SHA.
    pub reference: String,
    /// Direct download URL for the file at `reference`.
    pub raw_url: String,
    /// Shorthand form; byte-equal for equivalent inputs.
    pub canonical_url: String,
    /// Last segment of `path_in_repo`.
    pub suggested_filename: String,
}

/// Parse a source string in any supported dialect.
///
/// All dialects resolve to the same structured fields, so downstream code
/// never needs to know which form the user typed.
///
/// # Examples
///
/// ```
/// use almd::source::parse;
///
/// let parsed = parse("github:rxi/json.lua/json.lua@v0.1.2")?;
/// assert_eq!(parsed.owner, "rxi");
/// assert_eq!(parsed.reference, "v0.1.2");
/// assert_eq!(parsed.suggested_filename, "json.lua");
///
/// // A github.com file URL canonicalizes to the shorthand:
/// let parsed = parse("https://github.com/rxi/json.lua/blob/v0.1.2/json.lua")?;
/// assert_eq!(parsed.canonical_url, "github:rxi/json.lua/json.lua@v0.1.2");
/// # Ok::<(), almd::core::AlmdError>(())
/// ```
///
/// # Errors
///
/// [`AlmdError::BadSource`] for malformed input, [`AlmdError::UnsupportedHost`]
/// for URLs outside github.com, and [`AlmdError::UnsupportedTree`] for GitHub
/// `tree` URLs, which name directories rather than files.
pub fn parse(input: &str) -> Result<ParsedSource, AlmdError> {
    if let Some(rest) = input.strip_prefix("github:") {
        return parse_shorthand(input, rest);
    }

    let Some((host, segments)) = split_http_url(input) else {
        return Err(bad(input, "expected 'github:' shorthand or an https URL"));
    };

    match host {
        "raw.githubusercontent.com" => parse_raw_segments(input, &segments),
        "github.com" => parse_repo_url(input, &segments),
        other => {
            #[cfg(any(test, feature = "test-utils"))]
            if crate::resolver::testing::is_bypass_raw_host(other) {
                return parse_raw_segments(input, &segments);
            }
            Err(AlmdError::UnsupportedHost {
                host: other.to_string(),
            })
        }
    }
}

/// Build the raw download URL for a file at a given ref.
///
/// This is the single place raw URLs are constructed; substituting a
/// resolved SHA for a symbolic ref goes through here so the ref segment is
/// replaced structurally.
#[must_use]
pub fn raw_url_for(owner: &str, repo: &str, reference: &str, path_in_repo: &str) -> String {
    #[cfg(any(test, feature = "test-utils"))]
    if let Some(base) = crate::resolver::testing::raw_base_override() {
        return format!("{base}/{owner}/{repo}/{reference}/{path_in_repo}");
    }
    format!("https://raw.githubusercontent.com/{owner}/{repo}/{reference}/{path_in_repo}")
}

/// Whether `s` is a full 40-character lowercase hex commit SHA.
#[must_use]
pub fn is_commit_sha(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[0-9a-f]{40}$").unwrap()).is_match(s)
}

/// Whether `s` looks like an abbreviated or full commit SHA (7-40 hex).
///
/// Refs of this shape skip remote resolution: the user already pinned.
#[must_use]
pub fn is_hexish_ref(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[0-9a-f]{7,40}$").unwrap()).is_match(s)
}

fn bad(input: &str, reason: &str) -> AlmdError {
    AlmdError::BadSource {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Split an http(s) URL into host and path segments. Query strings and
/// fragments are not meaningful in any accepted dialect and are rejected
/// later as part of the path.
fn split_http_url(input: &str) -> Option<(&str, Vec<&str>)> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))?;
    let mut parts = rest.split('/');
    let host = parts.next()?;
    if host.is_empty() {
        return None;
    }
    Some((host, parts.collect()))
}

/// `github:owner/repo/path@ref`
fn parse_shorthand(input: &str, rest: &str) -> Result<ParsedSource, AlmdError> {
    let Some((left, reference)) = rest.rsplit_once('@') else {
        return Err(bad(input, "missing '@ref' suffix"));
    };
    let segments: Vec<&str> = left.split('/').collect();
    if segments.len() < 3 {
        return Err(bad(input, "expected 'github:owner/repo/path@ref'"));
    }
    build(
        input,
        segments[0],
        segments[1],
        &segments[2..].join("/"),
        reference,
    )
}

/// `{owner}/{repo}/{ref}/{path...}` segments of a raw content URL.
fn parse_raw_segments(input: &str, segments: &[&str]) -> Result<ParsedSource, AlmdError> {
    if segments.len() < 4 {
        return Err(bad(input, "expected '/owner/repo/ref/path' after the host"));
    }
    build(
        input,
        segments[0],
        segments[1],
        &segments[3..].join("/"),
        segments[2],
    )
}

/// `github.com` repository URLs: `blob`/`raw`/`tree` forms, or a bare
/// `owner/repo/path@ref` tail.
fn parse_repo_url(input: &str, segments: &[&str]) -> Result<ParsedSource, AlmdError> {
    if segments.len() < 3 {
        return Err(bad(input, "expected '/owner/repo/...' after github.com"));
    }

    match segments[2] {
        "tree" => Err(AlmdError::UnsupportedTree {
            url: input.to_string(),
        }),
        "blob" | "raw" => {
            if segments.len() < 5 {
                return Err(bad(
                    input,
                    "expected '/owner/repo/blob/ref/path' after github.com",
                ));
            }
            build(
                input,
                segments[0],
                segments[1],
                &segments[4..].join("/"),
                segments[3],
            )
        }
        _ => {
            // owner/repo/path@ref with the ref embedded in the tail
            let tail = segments[2..].join("/");
            let Some((path, reference)) = tail.rsplit_once('@') else {
                return Err(bad(input, "missing '@ref' in the file path"));
            };
            build(input, segments[0], segments[1], path, reference)
        }
    }
}

fn build(
    input: &str,
    owner: &str,
    repo: &str,
    path_in_repo: &str,
    reference: &str,
) -> Result<ParsedSource, AlmdError> {
    if owner.is_empty() || repo.is_empty() {
        return Err(bad(input, "owner and repository must be non-empty"));
    }
    if reference.is_empty() {
        return Err(bad(input, "ref must be non-empty"));
    }
    if path_in_repo.is_empty() || path_in_repo.split('/').any(str::is_empty) {
        return Err(bad(input, "file path must be non-empty"));
    }
    let suggested_filename = path_in_repo
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| bad(input, "file path has no filename"))?
        .to_string();

    Ok(ParsedSource {
        provider: Provider::GitHub,
        owner: owner.to_string(),
        repo: repo.to_string(),
        path_in_repo: path_in_repo.to_string(),
        reference: reference.to_string(),
        raw_url: raw_url_for(owner, repo, reference, path_in_repo),
        canonical_url: format!("github:{owner}/{repo}/{path_in_repo}@{reference}"),
        suggested_filename,
    })
}
