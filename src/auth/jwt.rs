use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::claims::ResolvedIdentity;

/// Default lifetime of a minted token.
///
/// Short enough to bound the blast radius of a leaked token, long enough
/// that downstream hops within a single request never see it expire.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60);

/// Claims embedded in the tokens this middleware mints for downstream
/// services.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Resolved account identifier.
    pub sub: String,
    pub email: String,
    /// Display name as provided by the identity provider.
    pub name: String,
    /// Lowercased display name.
    pub preferred_username: String,
    pub email_verified: bool,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Errors raised while constructing the minter or minting/verifying
/// tokens.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MintError {
    /// The configured signing secret is empty.
    #[error("signing secret must not be empty")]
    EmptySecret,
    /// Signing or encoding the token failed.
    #[error("token signing failed: {detail}")]
    SigningFailed { detail: String },
    /// A presented token failed validation.
    #[error("token rejected: {detail}")]
    InvalidToken { detail: String },
}

/// Configuration for [`TokenMinter`], passed by value to the constructor.
#[derive(Debug, Clone)]
pub struct MinterConfig {
    /// Secret used to sign and verify minted tokens. Must not be empty.
    pub secret: Vec<u8>,
    /// Token lifetime. Defaults to [`DEFAULT_TOKEN_TTL`].
    pub ttl: Duration,
    /// Signing algorithm. Defaults to HS256.
    pub algorithm: Algorithm,
}

impl MinterConfig {
    /// Create a config with the given secret and the documented defaults
    /// for everything else.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl: DEFAULT_TOKEN_TTL,
            algorithm: Algorithm::HS256,
        }
    }
}

/// Mints signed, time-bounded tokens carrying a resolved identity.
///
/// Construction fails on an unusable signing configuration; the caller
/// decides whether that aborts startup.
pub struct TokenMinter {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenMinter {
    pub fn new(config: MinterConfig) -> Result<Self, MintError> {
        if config.secret.is_empty() {
            return Err(MintError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            algorithm: config.algorithm,
            ttl: config.ttl,
        })
    }

    /// Mint a token whose subject is the resolved account id and whose
    /// claims embed the identity's email, display name and verification
    /// flag.
    pub fn mint(&self, identity: &ResolvedIdentity, now: SystemTime) -> Result<String, MintError> {
        let iat = now
            .duration_since(UNIX_EPOCH)
            .map_err(|_| MintError::SigningFailed {
                detail: "system clock is before the unix epoch".to_string(),
            })?
            .as_secs() as i64;

        let claims = TokenClaims {
            sub: identity.account_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            preferred_username: identity.display_name.to_lowercase(),
            email_verified: identity.email_verified,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            MintError::SigningFailed {
                detail: e.to_string(),
            }
        })
    }

    /// Verify a minted token and return its claims.
    ///
    /// Expired tokens and wrong signatures map to
    /// [`MintError::InvalidToken`] with stable detail strings
    /// (`"token expired"`, `"invalid signature"`); any other decode
    /// failure carries the underlying error text.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, MintError> {
        // Default Validation already checks exp; pin the algorithm to the
        // configured one.
        let validation = Validation::new(self.algorithm);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => MintError::InvalidToken {
                    detail: "token expired".to_string(),
                },
                jsonwebtoken::errors::ErrorKind::InvalidSignature => MintError::InvalidToken {
                    detail: "invalid signature".to_string(),
                },
                _ => MintError::InvalidToken {
                    detail: e.to_string(),
                },
            })
    }
}
