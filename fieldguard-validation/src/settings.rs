// Environment-driven evaluator settings

use crate::{BoundsMode, RuleEvaluator, RuleTable, TableError};
use fieldguard_config::{EnvLoader, Result};
use fieldguard_log::info;
use std::path::PathBuf;

/// Environment prefix for guard settings
pub const ENV_PREFIX: &str = "FIELDGUARD";

/// Settings read from `FIELDGUARD_*` variables
///
/// | variable | meaning |
/// |---|---|
/// | `FIELDGUARD_RULES_PATH` | `.json`/`.toml` rule table to load |
/// | `FIELDGUARD_BOUNDS` | `native` (default) or `numeric` |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardSettings {
    pub rules_path: Option<PathBuf>,
    pub bounds: BoundsMode,
}

impl GuardSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_loader(&EnvLoader::new(Some(ENV_PREFIX)))
    }

    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        Ok(Self {
            rules_path: loader.load_opt("rules_path").map(PathBuf::from),
            bounds: loader
                .parse_opt("bounds", "`native` or `numeric`")?
                .unwrap_or_default(),
        })
    }

    /// Load the configured rule table; no path yields an empty table
    pub fn load_table(&self) -> std::result::Result<RuleTable, TableError> {
        match self.rules_path {
            Some(ref path) => {
                let table = RuleTable::from_path(path)?;
                info!(path = path.display(), routes = table.len(); "Loaded rule table");
                Ok(table)
            }
            None => Ok(RuleTable::new()),
        }
    }
}

impl RuleEvaluator {
    /// Build an evaluator from settings, loading its rule table
    pub fn from_settings(settings: &GuardSettings) -> std::result::Result<Self, TableError> {
        Ok(Self::new(settings.load_table()?).with_bounds(settings.bounds))
    }
}
