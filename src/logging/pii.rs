//! PII redaction for log output.
//!
//! Everything this middleware handles is sensitive: the lookup key is
//! an email address and the product is a bearer token. Log statements
//! route emails through [`Redacted`]; tokens are never logged at all,
//! but the redactor also masks opaque token-like runs as a backstop.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Email pattern: matches standard email addresses
/// SAFETY: This regex pattern is a vetted literal that compiles successfully
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
});

/// Opaque token pattern: base64-like runs of 16+ chars (covers JWT segments)
/// SAFETY: This regex pattern is a vetted literal that compiles successfully
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Za-z0-9+/_-]{16,}={0,2}\b").unwrap()
});

/// Redacts sensitive information from a string.
///
/// Emails keep the first character of the local part and the full
/// domain; opaque token-like runs are replaced wholesale. Emails are
/// processed first so their domains are not re-matched as tokens.
pub fn redact(input: &str) -> String {
    let email_redacted = EMAIL_REGEX.replace_all(input, |caps: &regex::Captures| {
        let full_match = &caps[0];
        match full_match.find('@') {
            Some(at_pos) if at_pos > 0 => {
                let first_char = &full_match[..1];
                let domain = &full_match[at_pos..];
                format!("{first_char}***{domain}")
            }
            _ => full_match.to_string(),
        }
    });

    TOKEN_REGEX
        .replace_all(&email_redacted, "[REDACTED_TOKEN]")
        .to_string()
}

/// A wrapper that redacts a sensitive string when displayed.
///
/// Lets log statements carry an email field without leaking it:
/// `debug!(email = %Redacted(email), ...)`.
pub struct Redacted<'a>(pub &'a str);

impl<'a> fmt::Display for Redacted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl<'a> fmt::Debug for Redacted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}
