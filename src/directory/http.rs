//! HTTP adapter for the directory port.
//!
//! Talks to an accounts service exposing the listing endpoint as JSON
//! over HTTP. The email travels as a structured request field, never
//! interpolated into a query expression, so no escaping is required.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AccountRecord, DirectoryClient, DirectoryError};

/// Default timeout for a single directory request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const LIST_ACCOUNTS_PATH: &str = "/api/v0/accounts/accounts-list";

/// Configuration for [`HttpDirectoryClient`], passed by value to the
/// constructor.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL of the accounts service, e.g. `http://accounts:9180`.
    pub base_url: String,
    /// Per-request timeout. Defaults to [`DEFAULT_TIMEOUT`].
    pub timeout: Duration,
}

impl DirectoryConfig {
    /// Create a config with the given base URL and the documented
    /// defaults for everything else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListAccountsRequest<'a> {
    email: &'a str,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct ListAccountsResponse {
    // The service omits the field entirely when nothing matches.
    #[serde(default)]
    accounts: Vec<AccountRecord>,
}

/// [`DirectoryClient`] over HTTP.
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    list_url: String,
}

impl HttpDirectoryClient {
    pub fn new(config: DirectoryConfig) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DirectoryError::Config {
                detail: e.to_string(),
            })?;

        let list_url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            LIST_ACCOUNTS_PATH
        );

        Ok(Self { client, list_url })
    }
}

fn decode_listing(body: &[u8]) -> Result<Vec<AccountRecord>, DirectoryError> {
    let listing: ListAccountsResponse =
        serde_json::from_slice(body).map_err(|e| DirectoryError::Decode {
            detail: e.to_string(),
        })?;
    Ok(listing.accounts)
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn find_by_email(
        &self,
        email: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRecord>, DirectoryError> {
        let response = self
            .client
            .post(&self.list_url)
            .json(&ListAccountsRequest {
                email,
                page_size: max_results,
            })
            .send()
            .await
            .map_err(|e| DirectoryError::Transport {
                detail: e.to_string(),
            })?;

        // An empty listing is a 200 with no accounts; any non-success
        // status means the service itself is misbehaving.
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DirectoryError::Transport {
                detail: e.to_string(),
            })?;

        decode_listing(&body)
    }
}
