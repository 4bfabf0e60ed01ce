//! Remote ref resolution via the GitHub commits API.
//!
//! Symbolic refs (branches, tags) are pinned to concrete commit SHAs by
//! asking for the most recent commit that touched the dependency's path:
//!
//! ```text
//! GET {api}/repos/{owner}/{repo}/commits?path={path}&sha={ref}&per_page=1
//! ```
//!
//! Resolution failures are non-fatal to callers: the reconciliation engine
//! falls back to content hashing when no commit SHA can be obtained.

use crate::core::AlmdError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Production API base. Tests redirect this through [`testing`].
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// The only field we need from each element of the commits response.
#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
}

/// Client for pinning a symbolic ref to a commit SHA.
#[derive(Debug, Clone)]
pub struct RefResolver {
    client: Client,
}

impl RefResolver {
    /// Wrap an existing HTTP client. The client carries the timeout and
    /// User-Agent configuration; see [`crate::net::http_client`].
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api_base() -> String {
        #[cfg(any(test, feature = "test-utils"))]
        if let Some(base) = testing::api_base_override() {
            return base;
        }
        GITHUB_API_BASE.to_string()
    }

    /// Resolve `reference` to the SHA of the latest commit touching `path`
    /// in `owner/repo`.
    ///
    /// # Errors
    ///
    /// - [`AlmdError::NoSuchCommit`] when the API answers with an empty list
    ///   (unknown ref, or a path the ref never touched)
    /// - [`AlmdError::HttpStatus`] for any non-200 response
    /// - [`AlmdError::Parse`] when the payload is not the expected JSON
    /// - [`AlmdError::Network`] / [`AlmdError::BodyRead`] for transport errors
    pub async fn latest_commit_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<String, AlmdError> {
        let url = format!("{}/repos/{owner}/{repo}/commits", Self::api_base());
        tracing::debug!("resolving ref '{reference}' for {owner}/{repo}:{path}");

        let response = self
            .client
            .get(&url)
            .query(&[("path", path), ("sha", reference), ("per_page", "1")])
            .send()
            .await
            .map_err(|e| AlmdError::Network {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AlmdError::HttpStatus {
                url,
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| AlmdError::BodyRead {
            url: url.clone(),
            source: e,
        })?;

        let commits: Vec<CommitItem> =
            serde_json::from_slice(&body).map_err(|e| AlmdError::Parse {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        match commits.into_iter().next() {
            Some(commit) => {
                tracing::debug!("'{reference}' resolved to {}", commit.sha);
                Ok(commit.sha)
            }
            None => Err(AlmdError::NoSuchCommit {
                owner: owner.to_string(),
                repo: repo.to_string(),
                path: path.to_string(),
                reference: reference.to_string(),
            }),
        }
    }
}

/// Test-only endpoint redirection.
///
/// A process-global, mutex-guarded override that points both the API base
/// and the raw-download host at a local HTTP fixture. It is compiled only
/// for tests and the `test-utils` feature and is not reachable through any
/// configuration surface. Tests that toggle it must serialize.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Endpoints {
        api_base: String,
        raw_base: String,
    }

    static OVERRIDE: Mutex<Option<Endpoints>> = Mutex::new(None);

    /// Guard returned by [`override_endpoints`]; clears the override when
    /// dropped so a panicking test cannot leak it into the next one.
    pub struct EndpointGuard(());

    impl Drop for EndpointGuard {
        fn drop(&mut self) {
            *OVERRIDE.lock().unwrap() = None;
        }
    }

    /// Redirect the GitHub API and the raw host at local fixture URLs
    /// (e.g. a `wiremock` server) until the guard is dropped.
    #[must_use]
    pub fn override_endpoints(api_base: &str, raw_base: &str) -> EndpointGuard {
        *OVERRIDE.lock().unwrap() = Some(Endpoints {
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
        });
        EndpointGuard(())
    }

    pub(crate) fn api_base_override() -> Option<String> {
        OVERRIDE.lock().unwrap().as_ref().map(|e| e.api_base.clone())
    }

    pub(crate) fn raw_base_override() -> Option<String> {
        OVERRIDE.lock().unwrap().as_ref().map(|e| e.raw_base.clone())
    }

    /// Whether `host` (including any port) is the overridden raw host.
    pub(crate) fn is_bypass_raw_host(host: &str) -> bool {
        raw_base_override().is_some_and(|base| host_of(&base) == Some(host))
    }

    fn host_of(base: &str) -> Option<&str> {
        base.strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"))
            .map(|rest| rest.split('/').next().unwrap_or(rest))
    }

}
