// Environment variable loading

use crate::{ConfigError, Result};
use fieldguard_log::debug;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Prefixed environment variable loader
///
/// `EnvLoader::new(Some("FIELDGUARD"))` resolves `rules_path` to
/// `FIELDGUARD_RULES_PATH`.
pub struct EnvLoader {
    prefix: Option<String>,
    source: Option<HashMap<String, String>>,
}

impl EnvLoader {
    /// Create a loader reading the process environment
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            source: None,
        }
    }

    /// Create a loader reading from a fixed map instead of the process
    /// environment. Keys are full variable names, prefix included.
    pub fn from_map(prefix: Option<&str>, vars: HashMap<String, String>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            source: Some(vars),
        }
    }

    /// Seed the process environment from a `.env` file, then read it.
    ///
    /// Without a path, a missing `.env` in the working directory is not an
    /// error.
    pub fn with_dotenv(prefix: Option<&str>, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                debug!(path = path.display(); "Loaded .env file");
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(Self::new(prefix))
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = self.full_key(key);
        match self.source {
            Some(ref vars) => vars
                .get(&full_key)
                .cloned()
                .ok_or(ConfigError::KeyNotFound(full_key)),
            None => env::var(&full_key).map_err(ConfigError::EnvError),
        }
    }

    /// Load a variable if it is set and non-empty
    pub fn load_opt(&self, key: &str) -> Option<String> {
        self.load_var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and parse a variable; unset variables yield `None`
    pub fn parse_opt<T: FromStr>(&self, key: &str, expected: &'static str) -> Result<Option<T>> {
        match self.load_opt(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: self.full_key(key),
                    value: raw,
                    expected,
                }),
            None => Ok(None),
        }
    }

    /// Load all variables carrying the prefix, keyed by their lowercased
    /// suffix
    pub fn load(&self) -> HashMap<String, String> {
        let vars: Box<dyn Iterator<Item = (String, String)>> = match self.source {
            Some(ref vars) => Box::new(vars.clone().into_iter()),
            None => Box::new(env::vars()),
        };

        vars.filter_map(|(key, value)| match self.prefix {
            Some(ref prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| (rest.to_lowercase(), value)),
            None => Some((key.to_lowercase(), value)),
        })
        .collect()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
