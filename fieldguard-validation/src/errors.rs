// Validation errors, configuration faults and table errors

use fieldguard_core::{Error, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

/// Error type returned by fallible custom checks
pub type CheckError = Box<dyn std::error::Error + Send + Sync>;

/// The check that produced a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    Identifier,
    Min,
    Max,
    /// Value could not be coerced to a number under numeric bounds
    Bounds,
    Decimal2,
    Decimal6,
    MinLength,
    MaxLength,
    Email,
    Pattern,
    Numeric,
    Boolean,
    Date,
    Custom,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Identifier => "identifier",
            Constraint::Min => "min",
            Constraint::Max => "max",
            Constraint::Bounds => "bounds",
            Constraint::Decimal2 => "decimal2",
            Constraint::Decimal6 => "decimal6",
            Constraint::MinLength => "minLength",
            Constraint::MaxLength => "maxLength",
            Constraint::Email => "email",
            Constraint::Pattern => "pattern",
            Constraint::Numeric => "numeric",
            Constraint::Boolean => "boolean",
            Constraint::Date => "date",
            Constraint::Custom => "custom",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for a single field
///
/// Serializes as `{"field": .., "message": ..}`; the constraint is kept for
/// callers and logs only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Error message
    pub message: String,

    /// Validation constraint that failed, when known
    #[serde(skip)]
    pub constraint: Option<Constraint>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: None,
        }
    }

    /// Set the constraint
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Ordered collection of validation errors
///
/// Serializes as `{"errors": [...]}`, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// `(field, message)` pairs in order
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "message": e.message,
                })
            }).collect::<Vec<_>>()
        })
    }

    /// Render as a `400 Bad Request` JSON response
    pub fn into_response(self) -> Result<HttpResponse, Error> {
        HttpResponse::bad_request().with_json(&self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// A rule that cannot be applied to the value it met.
///
/// These signal a mistake in the rule configuration, not bad user input, and
/// abort the evaluation instead of joining the error list.
#[derive(ThisError, Debug)]
pub enum RuleFault {
    #[error("rule for `{field}` applies a length bound to {kind} value")]
    LengthUnavailable { field: String, kind: &'static str },

    #[error("rule for `{field}` has an invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("custom check for `{field}` raised an error: {source}")]
    CustomCheck { field: String, source: CheckError },
}

impl RuleFault {
    /// The field whose rule faulted
    pub fn field(&self) -> &str {
        match self {
            RuleFault::LengthUnavailable { field, .. }
            | RuleFault::InvalidPattern { field, .. }
            | RuleFault::CustomCheck { field, .. } => field,
        }
    }
}

impl From<RuleFault> for Error {
    fn from(fault: RuleFault) -> Self {
        Error::Internal(fault.to_string())
    }
}

/// Errors raised while building or loading a [`RuleTable`](crate::RuleTable)
#[derive(ThisError, Debug)]
pub enum TableError {
    #[error("no rules registered for route `{0}`")]
    UnknownRoute(String),

    #[error("route `{route}` has no rule for field `{field}`")]
    UnknownField { route: String, field: String },

    #[error("route `{route}` field `{field}` has an invalid pattern: {source}")]
    InvalidPattern {
        route: String,
        field: String,
        source: regex::Error,
    },

    #[error("invalid rule table: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] fieldguard_config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_without_constraint() {
        let error = ValidationError::new("amount", "amount required")
            .with_constraint(Constraint::Required);

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"field": "amount", "message": "amount required"})
        );
    }

    #[test]
    fn test_constraint_unset_until_given() {
        let plain = ValidationError::new("amount", "amount is off");
        assert_eq!(plain.constraint, None);

        let tagged = plain.with_constraint(Constraint::Max);
        assert_eq!(tagged.constraint, Some(Constraint::Max));

        let parsed: ValidationError =
            serde_json::from_str(r#"{"field": "a", "message": "m"}"#).unwrap();
        assert_eq!(parsed.constraint, None);
    }

    #[test]
    fn test_errors_wire_shape() {
        let errors = ValidationErrors::new(vec![
            ValidationError::new("id", "Invalid ObjectId format"),
            ValidationError::new("amount", "amount should be at least 0"),
        ]);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, errors.to_json());
        assert_eq!(json["errors"][1]["field"], "amount");
    }

    #[test]
    fn test_get_field_errors_and_pairs() {
        let mut errors = ValidationErrors::default();
        errors.add(ValidationError::new("a", "one"));
        errors.add(ValidationError::new("b", "two"));
        errors.add(ValidationError::new("a", "three"));

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get_field_errors("a").len(), 2);
        assert_eq!(errors.pairs(), vec![("a", "one"), ("b", "two"), ("a", "three")]);
    }

    #[test]
    fn test_into_response() {
        let errors = ValidationErrors::new(vec![ValidationError::new("email", "email required")]);
        let response = errors.into_response().unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["errors"][0]["message"], "email required");
    }

    #[test]
    fn test_fault_maps_to_internal() {
        let fault = RuleFault::LengthUnavailable {
            field: "count".to_string(),
            kind: "a number",
        };
        assert_eq!(fault.field(), "count");

        let err: Error = fault.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("length bound to a number value"));
    }
}
