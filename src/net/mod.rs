//! HTTP download with error classification.
//!
//! One [`reqwest::Client`] is built per invocation and shared between the
//! downloader and the ref resolver. Redirects are followed; there are no
//! retries at this layer (or anywhere above it).

use crate::core::AlmdError;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Default network timeout. Hosts can inject a different value through
/// [`http_client`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("almd/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client.
///
/// The GitHub API rejects requests without a User-Agent, so one is always
/// set here.
pub fn http_client(timeout: Option<Duration>) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
        .build()
        .context("Failed to build HTTP client")
}

/// Fetches file content over HTTP.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the full body.
    ///
    /// # Errors
    ///
    /// - [`AlmdError::Network`] for DNS, connection, TLS, or timeout failures
    /// - [`AlmdError::HttpStatus`] for any status other than 200
    /// - [`AlmdError::BodyRead`] when the body cannot be read to completion
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, AlmdError> {
        tracing::debug!("downloading {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AlmdError::Network {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AlmdError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| AlmdError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;

        tracing::debug!("downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    /// The underlying client, for sharing with the ref resolver.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}
