//! Redis cache implementation.

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use scoring_log::info;
use std::future::Future;
use std::time::Duration;

/// Redis cache store.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: CacheConfig,
}

impl RedisCache {
    /// Connect to Redis, retrying according to `config.reconnect`.
    ///
    /// A connection counts as established once the server answers `PING`.
    /// Spending the whole retry budget is an error.
    ///
    /// ```no_run
    /// use scoring_cache::*;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), CacheError> {
    ///     let config = CacheConfig::redis("redis://127.0.0.1:6379/0")?;
    ///     let cache = RedisCache::new(config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> CacheResult<Self> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::InvalidUrl(e.to_string()))?;

        let connection = config
            .reconnect
            .connect(|| Self::open(client.clone(), config.connection_timeout))
            .await?;

        info!(target: "scoring::cache", "connected to redis at {}", config.url);
        Ok(Self { connection, config })
    }

    async fn open(client: Client, timeout: Duration) -> CacheResult<ConnectionManager> {
        let mut connection = with_timeout(timeout, ConnectionManager::new(client)).await?;
        let _: String = with_timeout(timeout, redis::cmd("PING").query_async(&mut connection)).await?;
        Ok(connection)
    }

    /// Get the underlying connection manager.
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Build the full key with prefix.
    fn build_key(&self, key: &str) -> String {
        self.config.build_key(key)
    }

    async fn run<T>(
        &self,
        command: impl Future<Output = redis::RedisResult<T>>,
    ) -> CacheResult<T> {
        with_timeout(self.config.operation_timeout, command).await
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    command: impl Future<Output = redis::RedisResult<T>>,
) -> CacheResult<T> {
    match tokio::time::timeout(timeout, command).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout),
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get_json(&self, key: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        self.run(conn.get(&key)).await
    }

    async fn set_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();

        match ttl {
            Some(ttl) => self.run(conn.set_ex(&key, value, ttl.as_secs().max(1))).await,
            None => self.run(conn.set(&key, value)).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        self.run(conn.del(&key)).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let key = self.build_key(key);
        let mut conn = self.connection.clone();
        self.run(conn.exists(&key)).await
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        self.run(redis::cmd("FLUSHDB").query_async(&mut conn)).await
    }
}
