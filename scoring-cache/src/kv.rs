//! Failure-tolerant key-value facade used by request handlers.

use crate::traits::CacheStore;
use scoring_log::error;
use std::sync::Arc;
use std::time::Duration;

/// Key-value store whose operations never fail.
///
/// Backend errors are logged and degrade to a miss on `get` and a dropped
/// write on `set`, so a flaky cache only costs recomputation.
#[derive(Clone)]
pub struct KvStore {
    store: Arc<dyn CacheStore>,
}

impl KvStore {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Wrap a concrete store.
    pub fn from_store(store: impl CacheStore + 'static) -> Self {
        Self::new(Arc::new(store))
    }

    /// Value stored under `key`, or `None` on a miss or a backend error.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.store.get_json(key).await {
            Ok(value) => value,
            Err(e) => {
                error!(target: "scoring::cache", "cache get \"{}\" failed: {}", key, e);
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`; failures are logged and dropped.
    pub async fn set(&self, key: &str, value: impl Into<String>, ttl: Option<Duration>) {
        if let Err(e) = self.store.set_json(key, value.into(), ttl).await {
            error!(target: "scoring::cache", "cache set \"{}\" failed: {}", key, e);
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheError, CacheResult};
    use crate::memory::InMemoryCache;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get_json(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Connection("connection reset".to_string()))
        }

        async fn set_json(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::Timeout)
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Timeout)
        }

        async fn exists(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Timeout)
        }

        async fn clear(&self) -> CacheResult<()> {
            Err(CacheError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let kv = KvStore::from_store(InMemoryCache::new());

        kv.set("uid:1", "3.0", Some(Duration::from_secs(3600))).await;
        assert_eq!(kv.get("uid:1").await, Some("3.0".to_string()));
        assert_eq!(kv.get("uid:2").await, None);
    }

    #[tokio::test]
    async fn test_backend_errors_degrade() {
        let kv = KvStore::from_store(BrokenStore);

        kv.set("uid:1", "3.0", None).await;
        assert_eq!(kv.get("uid:1").await, None);
    }
}
