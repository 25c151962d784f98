//! Account directory port.
//!
//! The directory is the external system of record mapping emails to
//! account identifiers. This middleware only ever queries it by
//! email-equality filter and only ever reads the returned records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;

pub use http::{DirectoryConfig, HttpDirectoryClient};

/// An account as the directory reports it.
///
/// `display_name` is tolerated absent on the wire; the resolver only
/// reads `id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

/// Failures reaching or understanding the directory.
///
/// The resolver treats every variant as directory unavailability; the
/// split exists for logs and for callers that want to alert on
/// deployment errors (`Status`) separately from network flakes
/// (`Transport`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// The client could not be built from its configuration.
    #[error("directory client configuration rejected: {detail}")]
    Config { detail: String },
    /// The request never produced a response (connect error, timeout).
    #[error("directory request failed: {detail}")]
    Transport { detail: String },
    /// The directory answered with a non-success status.
    #[error("directory returned status {status}")]
    Status { status: u16 },
    /// The response body could not be decoded.
    #[error("directory response could not be decoded: {detail}")]
    Decode { detail: String },
}

/// Queries the external account directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Return accounts whose email equals `email`, at most
    /// `max_results` of them.
    ///
    /// No ordering is guaranteed among multiple matches; callers treat
    /// more than one match as an error, not a choice.
    async fn find_by_email(
        &self,
        email: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRecord>, DirectoryError>;
}
