//! Identity claims shared between the upstream verifier and this middleware.

use serde::{Deserialize, Serialize};

/// Verified identity claims inserted into request extensions by the
/// upstream OIDC claim-extraction middleware.
///
/// Absence of this value in a request's extensions is the designed
/// bypass condition: the request is forwarded untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OidcClaims {
    pub email: String,
    pub display_name: String,
    /// Whether the identity provider has verified the email address.
    pub email_verified: bool,
}

/// An identity claim that has been resolved to exactly one account.
///
/// Built fresh per request from [`OidcClaims`] plus the account id the
/// resolver produced; never shared across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Stable internal account identifier (the minted token's subject).
    pub account_id: String,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
}

impl ResolvedIdentity {
    pub fn new(account_id: impl Into<String>, claims: OidcClaims) -> Self {
        Self {
            account_id: account_id.into(),
            email: claims.email,
            display_name: claims.display_name,
            email_verified: claims.email_verified,
        }
    }
}
