// Declarative field rules and the per-route rule table

use crate::{CheckError, TableError};
use fieldguard_config::ConfigLoader;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

type CheckFn = dyn Fn(Option<&Value>) -> Result<bool, CheckError> + Send + Sync;

/// Typed predicate attached to a rule
///
/// Receives the raw field value (`None` when the field is absent).
#[derive(Clone)]
pub struct CustomCheck(Arc<CheckFn>);

impl CustomCheck {
    /// Wrap an infallible predicate
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(
            move |value: Option<&Value>| -> Result<bool, CheckError> { Ok(check(value)) },
        ))
    }

    /// Wrap a predicate whose errors abort the evaluation
    pub fn fallible<F>(check: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<bool, CheckError> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn call(&self, value: Option<&Value>) -> Result<bool, CheckError> {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCheck(..)")
    }
}

/// Regular expression kept as its source string and compiled on first use
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    compiled: OnceCell<Regex>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression; compiled once and cached
    pub fn regex(&self) -> Result<&Regex, regex::Error> {
        self.compiled.get_or_try_init(|| Regex::new(&self.source))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Constraints for one named body field
///
/// Deserializes from the camelCase rule-table format:
///
/// ```json
/// {"field": "amount", "min": 0, "decimal2": true, "message": "amount required"}
/// ```
///
/// `message` (alias `requiredMessage`) makes the field required: a falsy value
/// emits it and skips the remaining constraints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Rule {
    pub field: String,

    #[serde(default, alias = "requiredMessage", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub decimal2: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub decimal6: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub email: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub numeric: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub boolean: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub date: bool,

    #[serde(skip)]
    pub custom: Option<CustomCheck>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Rule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    /// Require the field, reporting `message` when it is falsy
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn decimal2(mut self) -> Self {
        self.decimal2 = true;
        self
    }

    pub fn decimal6(mut self) -> Self {
        self.decimal6 = true;
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn boolean(mut self) -> Self {
        self.boolean = true;
        self
    }

    pub fn date(mut self) -> Self {
        self.date = true;
        self
    }

    /// Attach an infallible custom predicate
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.custom = Some(CustomCheck::new(check));
        self
    }

    /// Attach a custom predicate that may fail the whole evaluation
    pub fn custom_fallible<F>(mut self, check: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<bool, CheckError> + Send + Sync + 'static,
    {
        self.custom = Some(CustomCheck::fallible(check));
        self
    }

    /// Whether `min` or `max` is set
    pub fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Route key to ordered rule list
///
/// Built once and shared read-only; rule order is evaluation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    routes: HashMap<String, Vec<Rule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a route's rules, builder style
    pub fn route(mut self, key: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.insert(key, rules);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, rules: Vec<Rule>) {
        self.routes.insert(key.into(), rules);
    }

    pub fn get(&self, key: &str) -> Option<&[Rule]> {
        self.routes.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Attach a custom check to every rule for `field` on `route`
    ///
    /// Loaded tables carry no predicates; this resolves them before the
    /// table is handed to an evaluator.
    pub fn with_custom(
        mut self,
        route: &str,
        field: &str,
        check: CustomCheck,
    ) -> Result<Self, TableError> {
        let rules = self
            .routes
            .get_mut(route)
            .ok_or_else(|| TableError::UnknownRoute(route.to_string()))?;

        let mut attached = false;
        for rule in rules.iter_mut().filter(|r| r.field == field) {
            rule.custom = Some(check.clone());
            attached = true;
        }

        if !attached {
            return Err(TableError::UnknownField {
                route: route.to_string(),
                field: field.to_string(),
            });
        }
        Ok(self)
    }

    /// Build from a JSON value tree, compiling every pattern up front
    pub fn from_value(value: Value) -> Result<Self, TableError> {
        let table: Self = serde_json::from_value(value)?;
        table.check_patterns()?;
        Ok(table)
    }

    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let table: Self = serde_json::from_str(json)?;
        table.check_patterns()?;
        Ok(table)
    }

    /// Load a `.json` or `.toml` rule file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        Self::from_value(value)
    }

    /// Compile every pattern, reporting the first that is invalid
    pub fn check_patterns(&self) -> Result<(), TableError> {
        for (route, rules) in &self.routes {
            for rule in rules {
                if let Some(ref pattern) = rule.pattern {
                    pattern.regex().map_err(|source| TableError::InvalidPattern {
                        route: route.clone(),
                        field: rule.field.clone(),
                        source,
                    })?;
                }
            }
        }
        Ok(())
    }
}
