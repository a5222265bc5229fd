// Service settings

use scoring_cache::ReconnectPolicy;
use scoring_config::{ConfigLoader, ConfigManager, ConfigValidator, FileFormat, Result, Validate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Defaults shipped with the binary; they also declare every known key.
pub const DEFAULT_CONFIG: &str = include_str!("../configs/default_config.toml");

/// Resolved service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub salt: String,
    pub admin_login: String,
    #[serde(deserialize_with = "string_or_scalar")]
    pub admin_salt: String,
    pub log_file_path: String,
    pub redis_url: String,
    pub redis_reconnect_try: bool,
    pub redis_reconnect_attempt: u32,
    pub redis_reconnect_timeout: f64,
    pub redis_reconnect_smart_delay: bool,
    pub score_ttl: u64,
    pub interests_ttl: u64,
}

impl Settings {
    /// Defaults, then the optional override file, then `SCORING_*` variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let manager = Self::manager()?;

        if let Some(path) = config_path {
            manager.apply_file(path)?;
        }
        manager.apply_env()?;

        manager.load_validated()
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self> {
        Self::manager()?.load_validated()
    }

    fn manager() -> Result<ConfigManager> {
        let manager = ConfigManager::new();
        manager.load_defaults(ConfigLoader::new(FileFormat::Toml).parse(DEFAULT_CONFIG)?);
        Ok(manager)
    }

    /// Log file to mirror records to, if configured.
    pub fn log_file(&self) -> Option<&Path> {
        (!self.log_file_path.is_empty()).then(|| Path::new(&self.log_file_path))
    }

    /// Redis URL, or `None` to keep the cache in process memory.
    pub fn redis_url(&self) -> Option<&str> {
        (!self.redis_url.is_empty()).then_some(self.redis_url.as_str())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::from_settings(
            self.redis_reconnect_try,
            self.redis_reconnect_attempt,
            Duration::from_secs_f64(self.redis_reconnect_timeout),
            self.redis_reconnect_smart_delay,
        )
    }

    pub fn score_ttl(&self) -> Duration {
        Duration::from_secs(self.score_ttl)
    }

    pub fn interests_ttl(&self) -> Duration {
        Duration::from_secs(self.interests_ttl)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.salt, "salt")?;
        ConfigValidator::not_empty(&self.admin_login, "admin_login")?;
        ConfigValidator::in_range(self.redis_reconnect_attempt, 0, 100, "redis_reconnect_attempt")?;
        ConfigValidator::in_range(self.redis_reconnect_timeout, 0.0, 60.0, "redis_reconnect_timeout")?;
        ConfigValidator::in_range(self.score_ttl, 1, 30 * 24 * 3600, "score_ttl")?;
        ConfigValidator::in_range(self.interests_ttl, 1, 30 * 24 * 3600, "interests_ttl")?;
        if let Some(url) = self.redis_url() {
            ConfigValidator::has_scheme(url, &["redis", "rediss", "unix"], "redis_url")?;
        }
        Ok(())
    }
}

/// Accept `42` as well as `"42"` for string settings.
fn string_or_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}
