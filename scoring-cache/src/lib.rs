//! Key-value cache for the scoring API.
//!
//! Provides a [`CacheStore`] trait with an in-memory store and a Redis store,
//! a [`ReconnectPolicy`] for establishing the Redis connection at startup, and
//! the [`KvStore`] facade that request handlers use, which turns every backend
//! failure into a logged miss.
//!
//! # Features
//!
//! - `redis` - Enable Redis cache support (enabled by default)
//!
//! # Examples
//!
//! ```
//! use scoring_cache::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let kv = KvStore::from_store(InMemoryCache::new());
//! kv.set("i:1", r#"["cars","pets"]"#, Some(Duration::from_secs(3600))).await;
//! assert!(kv.get("i:1").await.is_some());
//! # }
//! ```
//!
//! ## Redis Cache
//!
//! ```no_run
//! use scoring_cache::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CacheError> {
//!     let config = CacheConfig::redis("redis://127.0.0.1:6379/0")?
//!         .with_reconnect(ReconnectPolicy::from_settings(true, 5, Duration::from_secs(1), true));
//!     let kv = KvStore::from_store(RedisCache::new(config).await?);
//!
//!     kv.set("uid:abc", "3.0", Some(Duration::from_secs(3600))).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod kv;
pub mod memory;
pub mod reconnect;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_cache;

pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use kv::KvStore;
pub use memory::InMemoryCache;
pub use reconnect::{BackoffStrategy, ReconnectPolicy};
pub use traits::CacheStore;

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
