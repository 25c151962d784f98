//! Web-boundary error type.
//!
//! Domain errors from the resolver and the minter convert into
//! [`AccountTokenError`], whose `ResponseError` impl renders the RFC
//! 7807 problem document the middleware returns when it terminates a
//! request. Detail strings are backend diagnostics and never carry the
//! email being resolved or any minted token.

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::auth::jwt::MintError;
use crate::resolver::ResolutionError;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AccountTokenError {
    #[error("Account not found")]
    AccountNotFound,
    #[error("Ambiguous account")]
    AmbiguousAccount,
    #[error("Directory unavailable: {detail}")]
    DirectoryUnavailable { detail: String },
    #[error("Cache read failed: {detail}")]
    CacheReadFailed { detail: String },
    #[error("Cache write failed: {detail}")]
    CacheWriteFailed { detail: String },
    #[error("Token signing failed: {detail}")]
    TokenSigningFailed { detail: String },
}

impl AccountTokenError {
    /// Helper method to extract the stable error code from any variant
    fn code(&self) -> &'static str {
        match self {
            AccountTokenError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AccountTokenError::AmbiguousAccount => "AMBIGUOUS_ACCOUNT",
            AccountTokenError::DirectoryUnavailable { .. } => "DIRECTORY_UNAVAILABLE",
            AccountTokenError::CacheReadFailed { .. } => "CACHE_READ_FAILED",
            AccountTokenError::CacheWriteFailed { .. } => "CACHE_WRITE_FAILED",
            AccountTokenError::TokenSigningFailed { .. } => "TOKEN_SIGNING_FAILED",
        }
    }

    /// Helper method to extract the error detail from any variant
    fn detail(&self) -> String {
        match self {
            AccountTokenError::AccountNotFound => {
                "No account matches the authenticated email".to_string()
            }
            AccountTokenError::AmbiguousAccount => {
                "More than one account matches the authenticated email".to_string()
            }
            AccountTokenError::DirectoryUnavailable { detail } => detail.clone(),
            AccountTokenError::CacheReadFailed { detail } => detail.clone(),
            AccountTokenError::CacheWriteFailed { detail } => detail.clone(),
            AccountTokenError::TokenSigningFailed { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AccountTokenError::AccountNotFound => StatusCode::NOT_FOUND,
            AccountTokenError::AmbiguousAccount => StatusCode::FORBIDDEN,
            AccountTokenError::DirectoryUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AccountTokenError::CacheReadFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AccountTokenError::CacheWriteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AccountTokenError::TokenSigningFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<ResolutionError> for AccountTokenError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NotFound => AccountTokenError::AccountNotFound,
            ResolutionError::Ambiguous => AccountTokenError::AmbiguousAccount,
            ResolutionError::DirectoryUnavailable(source) => {
                AccountTokenError::DirectoryUnavailable {
                    detail: source.to_string(),
                }
            }
            ResolutionError::CacheReadFailed(source) => AccountTokenError::CacheReadFailed {
                detail: source.to_string(),
            },
            ResolutionError::CacheWriteFailed(source) => AccountTokenError::CacheWriteFailed {
                detail: source.to_string(),
            },
        }
    }
}

impl From<MintError> for AccountTokenError {
    fn from(err: MintError) -> Self {
        AccountTokenError::TokenSigningFailed {
            detail: err.to_string(),
        }
    }
}

impl ResponseError for AccountTokenError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();

        let problem_details = ProblemDetails {
            type_: format!("https://example.com/probs/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .json(problem_details)
    }
}
