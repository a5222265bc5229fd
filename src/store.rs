// Cache backend selection

use crate::settings::Settings;
use scoring_cache::{CacheConfig, CacheResult, InMemoryCache, KvStore, RedisCache};
use scoring_log::{info, warn};

/// Open the key-value store described by the settings.
///
/// A Redis URL connects through the configured reconnect policy and fails
/// once the attempt budget is spent. An empty URL keeps everything in
/// process memory.
pub async fn open_store(settings: &Settings) -> CacheResult<KvStore> {
    match settings.redis_url() {
        Some(url) => {
            let config = CacheConfig::redis(url)?.with_reconnect(settings.reconnect_policy());
            let cache = RedisCache::new(config).await?;
            info!(target: "scoring::cache", "connected to {}", url);
            Ok(KvStore::from_store(cache))
        }
        None => {
            warn!(target: "scoring::cache", "redis_url is empty, using in-memory cache");
            Ok(KvStore::from_store(InMemoryCache::new()))
        }
    }
}
