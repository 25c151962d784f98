#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

//! Request-enrichment middleware for actix-web reverse proxies.
//!
//! An upstream authenticator verifies the caller and stores
//! [`OidcClaims`] in request extensions; this crate resolves the
//! claimed email to a stable account id (cache first, directory
//! lookup on a miss), mints a short-lived signed token for the
//! resolved identity and injects it as the `x-access-token` header
//! before the request reaches the proxied backend. Requests without
//! claims pass through untouched.

pub mod auth;
pub mod cache;
pub mod directory;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod resolver;


// Re-exports for public API
pub use auth::claims::{OidcClaims, ResolvedIdentity};
pub use auth::jwt::{MintError, MinterConfig, TokenClaims, TokenMinter};
pub use cache::memory::{MemoryCache, MemoryCacheConfig};
pub use cache::{Cache, CacheError};
pub use directory::http::{DirectoryConfig, HttpDirectoryClient};
pub use directory::{AccountRecord, DirectoryClient, DirectoryError};
pub use error::AccountTokenError;
pub use middleware::account_token::{AccountToken, ACCOUNT_TOKEN_HEADER};
pub use resolver::{AccountResolver, ResolutionError};

// Prelude for test convenience
pub mod prelude {
    pub use super::auth::claims::*;
    pub use super::auth::jwt::*;
    pub use super::cache::*;
    pub use super::directory::*;
    pub use super::error::*;
    pub use super::middleware::*;
    pub use super::resolver::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
