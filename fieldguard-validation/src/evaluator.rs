// Rule evaluation engine

use crate::validators::{
    BoundsMode, DecimalPlaces, IsBoolean, IsComparable, IsDate, IsEmail, IsNumeric, Matches, Max,
    MaxLength, Min, MinLength,
};
use crate::value::is_truthy;
use crate::{
    Constraint, IdentifierCheck, ObjectIdFormat, Rule, RuleFault, RuleTable, ValidationError,
    ValidationErrors,
};
use fieldguard_log::{debug, trace};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of evaluating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No violations; hand the request to the next stage
    Continue,
    /// Every violation found, in evaluation order
    Reject(ValidationErrors),
}

impl Verdict {
    pub fn is_continue(&self) -> bool {
        matches!(self, Verdict::Continue)
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Verdict::Continue => None,
            Verdict::Reject(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        match self {
            Verdict::Continue => Ok(()),
            Verdict::Reject(errors) => Err(errors),
        }
    }
}

/// Evaluates requests against a shared, immutable [`RuleTable`]
///
/// Cloning is cheap; clones share the table and the identifier check.
///
/// ```
/// use fieldguard_validation::{Rule, RuleEvaluator, RuleTable};
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let table = RuleTable::new().route(
///     "/orders",
///     vec![Rule::new("amount").required("amount required").min(0.0).decimal2()],
/// );
/// let evaluator = RuleEvaluator::new(table);
///
/// let body = json!({"amount": 10.50});
/// let verdict = evaluator
///     .evaluate("/orders", &HashMap::new(), body.as_object().unwrap())
///     .unwrap();
/// assert!(verdict.is_continue());
/// ```
#[derive(Clone)]
pub struct RuleEvaluator {
    table: Arc<RuleTable>,
    identifier: Arc<dyn IdentifierCheck>,
    bounds: BoundsMode,
}

impl RuleEvaluator {
    /// Create an evaluator with the `ObjectId` identifier check and native
    /// bounds
    pub fn new(table: RuleTable) -> Self {
        Self::from_shared(Arc::new(table))
    }

    pub fn from_shared(table: Arc<RuleTable>) -> Self {
        Self {
            table,
            identifier: Arc::new(ObjectIdFormat),
            bounds: BoundsMode::default(),
        }
    }

    /// Replace the check applied to the `id` path parameter
    pub fn with_identifier_check<C>(mut self, check: C) -> Self
    where
        C: IdentifierCheck + 'static,
    {
        self.identifier = Arc::new(check);
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsMode) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn bounds(&self) -> BoundsMode {
        self.bounds
    }

    /// Evaluate one request in a single pass
    ///
    /// Routes without rules always continue. Otherwise the `id` path
    /// parameter is checked first, then every rule in order; all violations
    /// are collected. A rule that cannot be applied to its value returns a
    /// [`RuleFault`] and the partial error list is dropped.
    pub fn evaluate(
        &self,
        route_key: &str,
        params: &HashMap<String, String>,
        body: &Map<String, Value>,
    ) -> Result<Verdict, RuleFault> {
        let rules = match self.table.get(route_key) {
            Some(rules) if !rules.is_empty() => rules,
            _ => {
                debug!(route = route_key; "No rules for route, skipping validation");
                return Ok(Verdict::Continue);
            }
        };

        let mut errors = Vec::new();

        if let Some(id) = params.get("id").filter(|id| !id.is_empty())
            && !self.identifier.is_valid(id)
        {
            errors.push(
                ValidationError::new("id", format!("Invalid {} format", self.identifier.name()))
                    .with_constraint(Constraint::Identifier),
            );
        }

        for rule in rules {
            self.apply(rule, body.get(&rule.field), &mut errors)?;
        }

        if errors.is_empty() {
            Ok(Verdict::Continue)
        } else {
            debug!(route = route_key, errors = errors.len(); "Request rejected");
            Ok(Verdict::Reject(ValidationErrors::new(errors)))
        }
    }

    fn apply(
        &self,
        rule: &Rule,
        value: Option<&Value>,
        errors: &mut Vec<ValidationError>,
    ) -> Result<(), RuleFault> {
        let field = rule.field.as_str();
        trace!(field = field, present = value.is_some(); "Applying rule");

        if let Some(ref message) = rule.message
            && !is_truthy(value)
        {
            errors.push(
                ValidationError::new(field, message.clone()).with_constraint(Constraint::Required),
            );
            return Ok(());
        }

        let comparable = match self.bounds {
            BoundsMode::Numeric if rule.has_bounds() => match IsComparable::validate(value, field) {
                Ok(()) => true,
                Err(e) => {
                    errors.push(e);
                    false
                }
            },
            _ => true,
        };

        if let Some(min) = rule.min
            && comparable
        {
            errors.extend(Min(min).validate(value, field, self.bounds).err());
        }
        if rule.decimal2 {
            errors.extend(DecimalPlaces::Two.validate(value, field).err());
        }
        if rule.decimal6 {
            errors.extend(DecimalPlaces::Six.validate(value, field).err());
        }
        if let Some(max) = rule.max
            && comparable
        {
            errors.extend(Max(max).validate(value, field, self.bounds).err());
        }
        if let Some(len) = rule.min_length {
            errors.extend(MinLength(len).try_validate(value, field)?);
        }
        if let Some(len) = rule.max_length {
            errors.extend(MaxLength(len).try_validate(value, field)?);
        }
        if rule.email {
            errors.extend(IsEmail::validate(value, field).err());
        }
        if let Some(ref pattern) = rule.pattern {
            errors.extend(Matches(pattern).try_validate(value, field)?);
        }
        if rule.numeric {
            errors.extend(IsNumeric::validate(value, field).err());
        }
        if rule.boolean {
            errors.extend(IsBoolean::validate(value, field).err());
        }
        if rule.date {
            errors.extend(IsDate::validate(value, field).err());
        }
        if let Some(ref check) = rule.custom {
            let passed = check.call(value).map_err(|source| RuleFault::CustomCheck {
                field: field.to_string(),
                source,
            })?;
            if !passed {
                errors.push(
                    ValidationError::new(field, format!("{} failed custom validation", field))
                        .with_constraint(Constraint::Custom),
                );
            }
        }

        Ok(())
    }
}

impl fmt::Debug for RuleEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEvaluator")
            .field("routes", &self.table.len())
            .field("identifier", &self.identifier.name())
            .field("bounds", &self.bounds)
            .finish()
    }
}
