//! Identity claims and credential minting.

pub mod claims;
pub mod jwt;

pub use claims::{OidcClaims, ResolvedIdentity};
pub use jwt::{MintError, MinterConfig, TokenClaims, TokenMinter, DEFAULT_TOKEN_TTL};
