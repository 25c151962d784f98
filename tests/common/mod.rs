#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_account_token::{
    AccountRecord, Cache, CacheError, DirectoryClient, DirectoryError, MemoryCache,
    MemoryCacheConfig, MinterConfig, OidcClaims, TokenMinter,
};
use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

// Logging is auto-installed for every test binary that declares `mod common`
#[ctor::ctor]
fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

/// Minter with a working HMAC configuration.
pub fn test_minter() -> Arc<TokenMinter> {
    Arc::new(TokenMinter::new(MinterConfig::new(TEST_SECRET)).expect("test minter config is valid"))
}

/// Minter whose signing always fails: an RSA algorithm paired with an
/// HMAC secret passes construction but is rejected when minting.
pub fn broken_minter() -> Arc<TokenMinter> {
    let mut config = MinterConfig::new(TEST_SECRET);
    config.algorithm = jsonwebtoken::Algorithm::RS256;
    Arc::new(TokenMinter::new(config).expect("construction succeeds; signing fails"))
}

pub fn verified_claims(email: &str) -> OidcClaims {
    OidcClaims {
        email: email.to_string(),
        display_name: "Ada Lovelace".to_string(),
        email_verified: true,
    }
}

pub fn record(id: &str, email: &str) -> AccountRecord {
    AccountRecord {
        id: id.to_string(),
        email: email.to_string(),
        display_name: "Ada Lovelace".to_string(),
    }
}

/// What a [`ScriptedDirectory`] does when queried.
pub enum DirectoryScript {
    /// Return these records.
    Matches(Vec<AccountRecord>),
    /// Fail with a transport error.
    Unavailable,
    /// Sleep for the duration, then return the records. Lets tests
    /// drop a request mid-lookup.
    Stall(Duration, Vec<AccountRecord>),
}

/// Directory double driven by a fixed script, recording every call.
pub struct ScriptedDirectory {
    script: DirectoryScript,
    pub calls: AtomicUsize,
    pub seen_limits: Mutex<Vec<u32>>,
}

impl ScriptedDirectory {
    pub fn matches(records: Vec<AccountRecord>) -> Arc<Self> {
        Self::with_script(DirectoryScript::Matches(records))
    }

    pub fn unavailable() -> Arc<Self> {
        Self::with_script(DirectoryScript::Unavailable)
    }

    pub fn stalled(delay: Duration, records: Vec<AccountRecord>) -> Arc<Self> {
        Self::with_script(DirectoryScript::Stall(delay, records))
    }

    fn with_script(script: DirectoryScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            seen_limits: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DirectoryClient for ScriptedDirectory {
    async fn find_by_email(
        &self,
        _email: &str,
        max_results: u32,
    ) -> Result<Vec<AccountRecord>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_limits.lock().push(max_results);
        match &self.script {
            DirectoryScript::Matches(records) => Ok(records.clone()),
            DirectoryScript::Unavailable => Err(DirectoryError::Transport {
                detail: "connection refused".to_string(),
            }),
            DirectoryScript::Stall(delay, records) => {
                tokio::time::sleep(*delay).await;
                Ok(records.clone())
            }
        }
    }
}

/// Cache wrapper counting reads and writes around a real in-memory
/// cache.
pub struct CountingCache {
    inner: MemoryCache<String>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl CountingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCache::new(MemoryCacheConfig::default()),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        })
    }

    /// Read through to the inner cache without bumping counters.
    pub async fn peek(&self, namespace: &str, key: &str) -> Option<String> {
        self.inner.get(namespace, key).await.ok().flatten()
    }

    /// Seed the inner cache without bumping counters.
    pub async fn seed(&self, namespace: &str, key: &str, value: &str) {
        self.inner
            .set(namespace, key, value.to_string())
            .await
            .expect("memory cache writes cannot fail");
    }
}

#[async_trait]
impl Cache<String> for CountingCache {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(namespace, key).await
    }

    async fn set(&self, namespace: &str, key: &str, value: String) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(namespace, key, value).await
    }
}

/// Cache double whose reads or writes are scripted to fail.
pub struct FailingCache {
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingCache {
    pub fn failing_reads() -> Arc<Self> {
        Arc::new(Self {
            fail_reads: true,
            fail_writes: false,
        })
    }

    pub fn failing_writes() -> Arc<Self> {
        Arc::new(Self {
            fail_reads: false,
            fail_writes: true,
        })
    }
}

#[async_trait]
impl Cache<String> for FailingCache {
    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_reads {
            Err(CacheError::new("read timed out"))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, _namespace: &str, _key: &str, _value: String) -> Result<(), CacheError> {
        if self.fail_writes {
            Err(CacheError::new("write timed out"))
        } else {
            Ok(())
        }
    }
}

/// Helper function to validate that a response follows the
/// ProblemDetails structure with the expected status, code and detail.
pub async fn assert_problem_details_structure<B>(
    resp: ServiceResponse<B>,
    expected_status: u16,
    expected_code: &str,
    expected_detail: &str,
) where
    B: MessageBody,
{
    // Assert status code
    assert_eq!(resp.status().as_u16(), expected_status);

    // Content-Type may include parameters (e.g., charset)
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    // Read and parse the response body
    let body = test::read_body(resp).await;
    let body_str = std::str::from_utf8(&body).expect("Response body should be valid UTF-8");

    let problem_details: Value = serde_json::from_str(body_str).unwrap_or_else(|_| {
        panic!("Failed to parse error body as ProblemDetails. Raw body: {body_str}")
    });

    // Assert all required keys are present
    for key in ["type", "title", "status", "detail", "code"] {
        assert!(
            problem_details.get(key).is_some(),
            "{key} field should be present"
        );
    }

    // Assert specific values
    assert_eq!(problem_details["code"], expected_code);
    assert_eq!(problem_details["detail"], expected_detail);
    assert_eq!(problem_details["status"], expected_status);

    // Assert type follows the expected format
    let type_value = problem_details["type"]
        .as_str()
        .expect("type field should be a string");
    assert!(
        type_value.starts_with("https://example.com/probs/"),
        "type should follow the expected URL format (got {type_value})"
    );
}
