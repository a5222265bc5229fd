//! Cache configuration types.

use crate::error::{CacheError, CacheResult};
use crate::reconnect::ReconnectPolicy;
use std::time::Duration;

/// Redis cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Connection URL
    pub url: String,

    /// Key prefix for all cache keys
    pub key_prefix: Option<String>,

    /// Timeout of a single connection attempt
    pub connection_timeout: Duration,

    /// Timeout of a single command
    pub operation_timeout: Duration,

    /// Retry policy for the initial connection
    pub reconnect: ReconnectPolicy,
}

impl CacheConfig {
    /// Create a new Redis cache configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoring_cache::CacheConfig;
    ///
    /// let config = CacheConfig::redis("redis://127.0.0.1:6379/0").unwrap();
    /// assert!(CacheConfig::redis("127.0.0.1:6379").is_err());
    /// ```
    pub fn redis(url: impl Into<String>) -> CacheResult<Self> {
        let url = url.into();
        if !["redis://", "rediss://", "unix://"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            return Err(CacheError::InvalidUrl(url));
        }

        Ok(Self {
            url,
            key_prefix: None,
            connection_timeout: Duration::from_millis(500),
            operation_timeout: Duration::from_millis(500),
            reconnect: ReconnectPolicy::default(),
        })
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the operation timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set the reconnect policy.
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Build the final key with prefix if configured.
    pub fn build_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}
