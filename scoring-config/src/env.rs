// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix of the service's environment variables
pub const ENV_PREFIX: &str = "SCORING";

/// Environment variable loader
///
/// Variables are looked up as `<PREFIX>_<KEY>` and returned under the
/// lowercased key without the prefix.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader for `SCORING_*` variables
    pub fn scoring() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    /// Load all matching environment variables
    pub fn load(&self) -> HashMap<String, String> {
        env::vars()
            .filter_map(|(key, value)| match self.prefix {
                Some(ref prefix) => key
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| (rest.to_lowercase(), value)),
                None => Some((key.to_lowercase(), value)),
            })
            .collect()
    }

    /// Load the variables for the given keys only
    pub fn load_keys<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> HashMap<String, String> {
        keys.into_iter()
            .filter_map(|key| {
                self.load_var(key)
                    .ok()
                    .map(|value| (key.to_string(), value))
            })
            .collect()
    }

    /// Name of the variable backing `key`
    pub fn var_name(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.var_name(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::scoring()
    }
}
