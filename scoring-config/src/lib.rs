//! Layered configuration for the scoring API
//!
//! A [`ConfigManager`] starts from a table of defaults, which also declares the
//! set of known keys. Override files and `SCORING_*` environment variables can
//! then change declared keys only: unknown keys are reported and ignored,
//! unchanged values are skipped, and every change is logged.
//!
//! ```
//! use scoring_config::{ConfigManager, FileFormat, ConfigLoader};
//!
//! let defaults = ConfigLoader::new(FileFormat::Toml)
//!     .parse("salt = \"Otus\"\nscore_ttl = 3600")
//!     .unwrap();
//! let manager = ConfigManager::new();
//! manager.load_defaults(defaults);
//!
//! let overrides = ConfigLoader::new(FileFormat::Json)
//!     .parse(r#"{"score_ttl": 60, "colour": "red"}"#)
//!     .unwrap();
//! assert_eq!(manager.apply_overrides(overrides), vec!["score_ttl".to_string()]);
//! assert_eq!(manager.get::<u64>("score_ttl").unwrap(), 60);
//! assert!(!manager.has("colour"));
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use scoring_log::{error, info};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Main configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<Map<String, Value>>>,
    env: EnvLoader,
}

impl ConfigManager {
    /// Create an empty configuration manager reading `SCORING_*` variables
    pub fn new() -> Self {
        Self::with_env(EnvLoader::scoring())
    }

    /// Create with a custom environment loader
    pub fn with_env(env: EnvLoader) -> Self {
        Self {
            config: Arc::new(RwLock::new(Map::new())),
            env,
        }
    }

    /// Replace the configuration with `defaults`, declaring its keys
    pub fn load_defaults(&self, defaults: Map<String, Value>) {
        *self.config.write() = defaults;
    }

    /// Apply overrides to declared keys, returning the keys that changed
    pub fn apply_overrides(&self, overrides: Map<String, Value>) -> Vec<String> {
        let mut config = self.config.write();
        let mut changed = Vec::new();

        for (key, value) in overrides {
            let Some(current) = config.get_mut(&key) else {
                error!(target: "scoring::config", "unknown config key \"{}\", ignored", key);
                continue;
            };

            if *current == value {
                continue;
            }

            info!(
                target: "scoring::config",
                "config \"{}\" changed: {} -> {}", key, current, value
            );
            *current = value;
            changed.push(key);
        }

        changed
    }

    /// Apply overrides read from a file, format detected from its extension
    pub fn apply_file(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let overrides = ConfigLoader::auto(path)?.load_file(path)?;

        info!(target: "scoring::config", "loading config overrides from {}", path.display());
        Ok(self.apply_overrides(overrides))
    }

    /// Apply environment variables backing declared keys
    ///
    /// A raw variable keeps the type of the value it overrides: it stays a
    /// string for string keys and is parsed as JSON otherwise.
    pub fn apply_env(&self) -> Result<Vec<String>> {
        let keys = self.keys();
        let raw = self.env.load_keys(keys.iter().map(String::as_str));

        let mut overrides = Map::new();
        {
            let config = self.config.read();
            for (key, value) in raw {
                let typed = match config.get(&key) {
                    Some(Value::String(_)) | None => Value::String(value),
                    Some(_) => serde_json::from_str(&value).map_err(|source| {
                        ConfigError::InvalidValue {
                            key: self.env.var_name(&key),
                            source,
                        }
                    })?,
                };
                overrides.insert(key, typed);
            }
        }

        Ok(self.apply_overrides(overrides))
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.config.write().insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.config.read();

        let value = config
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone()).map_err(|source| ConfigError::InvalidValue {
            key: key.to_string(),
            source,
        })
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get an integer value
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Get a float value
    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.config.read().contains_key(key)
    }

    /// All configuration keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.config.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Snapshot of the whole configuration
    pub fn snapshot(&self) -> Map<String, Value> {
        self.config.read().clone()
    }

    /// Deserialize the whole configuration and validate it
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let json_value = Value::Object(self.snapshot());

        let validated: T =
            serde_json::from_value(json_value).map_err(|source| ConfigError::InvalidValue {
                key: std::any::type_name::<T>().to_string(),
                source,
            })?;

        validated.validate()?;

        Ok(validated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
