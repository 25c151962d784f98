//! Namespaced key/value cache port.
//!
//! The cache stores typed values under a two-part (namespace, key)
//! address. Typing the value at the trait boundary means callers never
//! downcast an opaque entry; a backend that cannot represent the value
//! type simply does not implement the trait for it.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

pub use memory::{MemoryCache, MemoryCacheConfig};

/// A cache backend failure. Distinct from a miss: `get` reports a miss
/// as `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cache backend failure: {detail}")]
pub struct CacheError {
    pub detail: String,
}

impl CacheError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Concurrency-safe store mapping (namespace, key) to a value of type `V`.
///
/// Implementations must be safe for arbitrary concurrent callers. A
/// failed `set` must surface as an error so callers never believe a
/// value was stored when it was not.
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Look up a value. `Ok(None)` is a normal miss, not an error.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<V>, CacheError>;

    /// Store a value, overwriting any existing entry for the same
    /// (namespace, key).
    async fn set(&self, namespace: &str, key: &str, value: V) -> Result<(), CacheError>;
}
