//! In-memory cache adapter backed by `moka`.

use async_trait::async_trait;

use super::{Cache, CacheError};

/// Default entry capacity for [`MemoryCache`].
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    namespace: String,
    key: String,
}

/// Configuration for [`MemoryCache`], passed by value to the constructor.
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries before eviction. Defaults to
    /// [`DEFAULT_MAX_CAPACITY`].
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

/// Capacity-bounded in-process cache.
///
/// Capacity-only LRU: no TTL/TTI. A resolved entry stays valid for the
/// cache's lifetime; invalidation, where needed, is the caller's
/// concern. Operations on this adapter never fail; the error channel
/// in the [`Cache`] contract exists for fallible backends.
pub struct MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: moka::future::Cache<EntryKey, V>,
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: MemoryCacheConfig) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(config.max_capacity)
                .build(),
        }
    }
}

#[async_trait]
impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<V>, CacheError> {
        let entry_key = EntryKey {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        Ok(self.inner.get(&entry_key).await)
    }

    async fn set(&self, namespace: &str, key: &str, value: V) -> Result<(), CacheError> {
        let entry_key = EntryKey {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        self.inner.insert(entry_key, value).await;
        Ok(())
    }
}
