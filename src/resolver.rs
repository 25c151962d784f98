//! Email-to-account-id resolution.
//!
//! Sits between the cache and the directory: a cached id is returned
//! as-is, a miss falls through to a bounded directory lookup whose
//! single match is cached for subsequent requests. Zero matches and
//! multiple matches are distinct errors so callers can map them to
//! distinct HTTP statuses.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::cache::{Cache, CacheError};
use crate::directory::{DirectoryClient, DirectoryError};
use crate::logging::pii::Redacted;

/// Cache namespace for email-to-account-id entries.
pub const ACCOUNTS_NAMESPACE: &str = "accounts";

/// Number of matches requested from the directory per lookup. Two is
/// enough to tell "exactly one" apart from "more than one".
pub const EMAIL_LOOKUP_LIMIT: u32 = 2;

/// Errors raised while resolving an email to an account id.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// No account matches the email.
    #[error("no account matches the requested email")]
    NotFound,
    /// More than one account matches the email. The resolver never
    /// picks one arbitrarily.
    #[error("multiple accounts match the requested email")]
    Ambiguous,
    /// The directory could not be reached or returned an unusable
    /// response.
    #[error("directory lookup failed: {0}")]
    DirectoryUnavailable(#[from] DirectoryError),
    /// The cache read failed. Not a miss: a failed read never falls
    /// through to the directory.
    #[error("account cache read failed: {0}")]
    CacheReadFailed(#[source] CacheError),
    /// The cache write after a successful directory lookup failed.
    #[error("account cache write failed: {0}")]
    CacheWriteFailed(#[source] CacheError),
}

/// Resolves email addresses to stable account identifiers.
///
/// Holds its collaborators behind trait objects so tests can swap in
/// doubles for either side.
#[derive(Clone)]
pub struct AccountResolver {
    cache: Arc<dyn Cache<String>>,
    directory: Arc<dyn DirectoryClient>,
}

impl AccountResolver {
    pub fn new(cache: Arc<dyn Cache<String>>, directory: Arc<dyn DirectoryClient>) -> Self {
        Self { cache, directory }
    }

    /// Resolves `email` to an account id.
    ///
    /// This function is idempotent: the first resolution populates the
    /// cache and later calls for the same email return the cached id
    /// without another directory round trip. A cached id is trusted
    /// without re-validation for the lifetime of the entry.
    pub async fn resolve(&self, email: &str) -> Result<String, ResolutionError> {
        match self.cache.get(ACCOUNTS_NAMESPACE, email).await {
            Ok(Some(account_id)) => {
                debug!(
                    email = %Redacted(email),
                    account_id = %account_id,
                    "Account id served from cache"
                );
                return Ok(account_id);
            }
            Ok(None) => {
                debug!(email = %Redacted(email), "Account cache miss");
            }
            Err(err) => {
                error!(
                    email = %Redacted(email),
                    error = %err,
                    "Account cache read failed"
                );
                return Err(ResolutionError::CacheReadFailed(err));
            }
        }

        let matches = self
            .directory
            .find_by_email(email, EMAIL_LOOKUP_LIMIT)
            .await
            .map_err(|err| {
                error!(
                    email = %Redacted(email),
                    error = %err,
                    "Directory lookup failed"
                );
                ResolutionError::from(err)
            })?;

        if matches.len() > 1 {
            warn!(
                email = %Redacted(email),
                matches = matches.len(),
                "Multiple accounts match email"
            );
            return Err(ResolutionError::Ambiguous);
        }

        let Some(account) = matches.into_iter().next() else {
            warn!(email = %Redacted(email), "No account matches email");
            return Err(ResolutionError::NotFound);
        };

        if let Err(err) = self
            .cache
            .set(ACCOUNTS_NAMESPACE, email, account.id.clone())
            .await
        {
            error!(
                email = %Redacted(email),
                error = %err,
                "Account cache write failed"
            );
            return Err(ResolutionError::CacheWriteFailed(err));
        }

        debug!(
            email = %Redacted(email),
            account_id = %account.id,
            "Account id resolved from directory"
        );
        Ok(account.id)
    }
}
