// Built-in field validators

use crate::value::{self, format_number, length, native_cmp, numeric_cmp, to_display_string};
use crate::{Constraint, RuleFault, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

static DECIMAL2_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").unwrap());

static DECIMAL6_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,6})?$").unwrap());

static YEAR_MONTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})(?:-([0-9]{2}))?$").unwrap());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// Bound validators

/// How `min`/`max` order a field against its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsMode {
    /// Loose comparison: the field is coerced to a number and values that
    /// coerce to NaN never fail a bound.
    #[default]
    Native,
    /// Coerce the field to a number first; non-numeric values are reported
    /// once per rule instead of being compared.
    Numeric,
}

impl BoundsMode {
    pub fn compare(&self, value: Option<&Value>, bound: f64) -> Option<Ordering> {
        match self {
            BoundsMode::Native => native_cmp(value, bound),
            BoundsMode::Numeric => numeric_cmp(value, bound),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundsMode::Native => "native",
            BoundsMode::Numeric => "numeric",
        }
    }
}

impl FromStr for BoundsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(BoundsMode::Native),
            "numeric" => Ok(BoundsMode::Numeric),
            other => Err(format!("unknown bounds mode `{}`", other)),
        }
    }
}

/// Validates minimum value
pub struct Min(pub f64);

impl Min {
    pub fn validate(
        &self,
        value: Option<&Value>,
        field: &str,
        mode: BoundsMode,
    ) -> Result<(), ValidationError> {
        if mode.compare(value, self.0) == Some(Ordering::Less) {
            Err(ValidationError::new(
                field,
                format!("{} should be at least {}", field, format_number(self.0)),
            )
            .with_constraint(Constraint::Min))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum value
pub struct Max(pub f64);

impl Max {
    pub fn validate(
        &self,
        value: Option<&Value>,
        field: &str,
        mode: BoundsMode,
    ) -> Result<(), ValidationError> {
        if mode.compare(value, self.0) == Some(Ordering::Greater) {
            Err(ValidationError::new(
                field,
                format!("{} should be at most {}", field, format_number(self.0)),
            )
            .with_constraint(Constraint::Max))
        } else {
            Ok(())
        }
    }
}

/// Validates that a bounded field coerces to a finite number
pub struct IsComparable;

impl IsComparable {
    pub fn validate(value: Option<&Value>, field: &str) -> Result<(), ValidationError> {
        if value::to_number(value).is_finite() {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{} must be numeric to compare against its bounds", field),
            )
            .with_constraint(Constraint::Bounds))
        }
    }
}

// Format validators

/// Validates an unsigned decimal with limited fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalPlaces {
    Two,
    Six,
}

impl DecimalPlaces {
    pub fn places(&self) -> u8 {
        match self {
            DecimalPlaces::Two => 2,
            DecimalPlaces::Six => 6,
        }
    }

    pub fn validate(&self, value: Option<&Value>, field: &str) -> Result<(), ValidationError> {
        let (regex, constraint) = match self {
            DecimalPlaces::Two => (&*DECIMAL2_REGEX, Constraint::Decimal2),
            DecimalPlaces::Six => (&*DECIMAL6_REGEX, Constraint::Decimal6),
        };

        if regex.is_match(&to_display_string(value)) {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{} should have up to {} decimal places", field, self.places()),
            )
            .with_constraint(constraint))
        }
    }
}

/// Validates email shape (`something@something.something`, no whitespace)
pub struct IsEmail;

impl IsEmail {
    pub fn validate(value: Option<&Value>, field: &str) -> Result<(), ValidationError> {
        if EMAIL_REGEX.is_match(&to_display_string(value)) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a valid email", field))
                    .with_constraint(Constraint::Email),
            )
        }
    }
}

/// Validates that the value coerces to a finite number
pub struct IsNumeric;

impl IsNumeric {
    pub fn validate(value: Option<&Value>, field: &str) -> Result<(), ValidationError> {
        if value::to_number(value).is_finite() {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a numeric value", field))
                    .with_constraint(Constraint::Numeric),
            )
        }
    }
}

/// Validates that the value is a JSON boolean (not `"true"`/`"false"`)
pub struct IsBoolean;

impl IsBoolean {
    pub fn validate(value: Option<&Value>, field: &str) -> Result<(), ValidationError> {
        if matches!(value, Some(Value::Bool(_))) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a boolean value", field))
                    .with_constraint(Constraint::Boolean),
            )
        }
    }
}

/// Validates that the value parses as a calendar date
pub struct IsDate;

impl IsDate {
    pub fn validate(value: Option<&Value>, field: &str) -> Result<(), ValidationError> {
        if Self::parses(&to_display_string(value)) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a valid date", field))
                    .with_constraint(Constraint::Date),
            )
        }
    }

    /// Lenient date recognition: RFC 3339, RFC 2822, ISO dates and
    /// date-times, and common written forms.
    pub fn parses(input: &str) -> bool {
        let s = input.trim();
        if s.is_empty() {
            return false;
        }

        if DateTime::parse_from_rfc3339(s).is_ok() || DateTime::parse_from_rfc2822(s).is_ok() {
            return true;
        }

        if let Some(caps) = YEAR_MONTH_REGEX.captures(s) {
            let month = caps.get(2).map_or(Ok(1), |m| m.as_str().parse::<u32>());
            return match (caps[1].parse::<i32>(), month) {
                (Ok(year), Ok(month)) => NaiveDate::from_ymd_opt(year, month, 1).is_some(),
                _ => false,
            };
        }

        DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
            || DATE_FORMATS
                .iter()
                .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
    }
}

// Validators that can fault

/// Validates minimum length of a string or array
pub struct MinLength(pub usize);

impl MinLength {
    /// Faults when the value has no length
    pub fn try_validate(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Option<ValidationError>, RuleFault> {
        let len = length_of(value, field)?;
        Ok((len < self.0).then(|| {
            ValidationError::new(
                field,
                format!("{} should be at least {} characters", field, self.0),
            )
            .with_constraint(Constraint::MinLength)
        }))
    }
}

/// Validates maximum length of a string or array
pub struct MaxLength(pub usize);

impl MaxLength {
    /// Faults when the value has no length
    pub fn try_validate(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Option<ValidationError>, RuleFault> {
        let len = length_of(value, field)?;
        Ok((len > self.0).then(|| {
            ValidationError::new(
                field,
                format!("{} should be at most {} characters", field, self.0),
            )
            .with_constraint(Constraint::MaxLength)
        }))
    }
}

fn length_of(value: Option<&Value>, field: &str) -> Result<usize, RuleFault> {
    length(value).ok_or_else(|| RuleFault::LengthUnavailable {
        field: field.to_string(),
        kind: value::kind(value),
    })
}

/// Regex validator over the value's string form
pub struct Matches<'a>(pub &'a crate::Pattern);

impl Matches<'_> {
    /// Faults when the pattern does not compile
    pub fn try_validate(
        &self,
        value: Option<&Value>,
        field: &str,
    ) -> Result<Option<ValidationError>, RuleFault> {
        let regex = self.0.regex().map_err(|source| RuleFault::InvalidPattern {
            field: field.to_string(),
            pattern: self.0.as_str().to_string(),
            source,
        })?;

        Ok((!regex.is_match(&to_display_string(value))).then(|| {
            ValidationError::new(
                field,
                format!("{} does not match the required pattern", field),
            )
            .with_constraint(Constraint::Pattern)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pattern;
    use serde_json::json;

    fn ok(result: Result<(), ValidationError>) -> bool {
        result.is_ok()
    }

    #[test]
    fn test_decimal_places() {
        let two = DecimalPlaces::Two;
        let six = DecimalPlaces::Six;

        assert!(!ok(two.validate(Some(&json!("12.345")), "n")));
        assert!(ok(six.validate(Some(&json!("12.345")), "n")));
        assert!(ok(two.validate(Some(&json!("12")), "n")));
        assert!(ok(six.validate(Some(&json!("12")), "n")));
        assert!(!ok(two.validate(Some(&json!("-1.2")), "n")));
        assert!(!ok(six.validate(Some(&json!("-1.2")), "n")));
        assert!(!ok(two.validate(Some(&json!("12.")), "n")));
        assert!(!ok(six.validate(Some(&json!("12.")), "n")));
        assert!(!ok(two.validate(Some(&json!("")), "n")));
    }

    #[test]
    fn test_decimal_on_numbers() {
        let two = DecimalPlaces::Two;
        assert!(ok(two.validate(Some(&json!(10.50)), "amount")));
        assert!(!ok(two.validate(Some(&json!(-1.999)), "amount")));
        assert!(!ok(two.validate(None, "amount")));
        assert!(!ok(two.validate(Some(&json!(1e21)), "amount")));
        assert!(!ok(DecimalPlaces::Six.validate(Some(&json!(1e-7)), "rate")));
        assert!(ok(two.validate(Some(&json!(1e20)), "amount")));

        let err = two.validate(Some(&json!(1.234)), "amount").unwrap_err();
        assert_eq!(err.message, "amount should have up to 2 decimal places");
        assert_eq!(err.constraint, Some(Constraint::Decimal2));
    }

    #[test]
    fn test_is_email() {
        assert!(ok(IsEmail::validate(Some(&json!("a@b.co")), "email")));
        assert!(ok(IsEmail::validate(Some(&json!("user+tag@example.co.uk")), "email")));
        assert!(!ok(IsEmail::validate(Some(&json!("a.com")), "email")));
        assert!(!ok(IsEmail::validate(Some(&json!("a@b")), "email")));
        assert!(!ok(IsEmail::validate(Some(&json!("a b@c.d")), "email")));
    }

    #[test]
    fn test_is_boolean() {
        assert!(ok(IsBoolean::validate(Some(&json!(true)), "flag")));
        assert!(ok(IsBoolean::validate(Some(&json!(false)), "flag")));
        assert!(!ok(IsBoolean::validate(Some(&json!("true")), "flag")));
        assert!(!ok(IsBoolean::validate(Some(&json!(1)), "flag")));
        assert!(!ok(IsBoolean::validate(None, "flag")));
    }

    #[test]
    fn test_is_numeric() {
        assert!(ok(IsNumeric::validate(Some(&json!(3.5)), "n")));
        assert!(ok(IsNumeric::validate(Some(&json!(" 42 ")), "n")));
        assert!(ok(IsNumeric::validate(Some(&json!(null)), "n")));
        assert!(!ok(IsNumeric::validate(Some(&json!("42abc")), "n")));
        assert!(!ok(IsNumeric::validate(Some(&json!("Infinity")), "n")));
        assert!(!ok(IsNumeric::validate(None, "n")));
    }

    #[test]
    fn test_is_date() {
        for good in [
            "2024-01-15",
            "2024-01",
            "2024",
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00.123+02:00",
            "2024-01-15T10:30:00",
            "2024-01-15 10:30",
            "01/15/2024",
            "2024/01/15",
            "March 17, 2024",
            "17 Mar 2024",
            "Tue, 1 Jul 2003 10:52:37 +0200",
        ] {
            assert!(IsDate::parses(good), "expected {good:?} to parse");
        }

        for bad in ["", "not a date", "2024-02-30", "2024-13", "13/45/2024", "true"] {
            assert!(!IsDate::parses(bad), "expected {bad:?} to be rejected");
        }

        assert!(!ok(IsDate::validate(None, "when")));
        assert!(ok(IsDate::validate(Some(&json!(2024)), "when")));
    }

    #[test]
    fn test_bounds_native() {
        let min = Min(0.0);
        let err = min
            .validate(Some(&json!(-5)), "amount", BoundsMode::Native)
            .unwrap_err();
        assert_eq!(err.message, "amount should be at least 0");

        assert!(ok(min.validate(Some(&json!(0)), "amount", BoundsMode::Native)));
        assert!(ok(min.validate(None, "amount", BoundsMode::Native)));

        let max = Max(10.0);
        assert!(ok(max.validate(Some(&json!("9")), "qty", BoundsMode::Native)));
        assert!(!ok(max.validate(Some(&json!("11")), "qty", BoundsMode::Native)));
        assert!(ok(max.validate(Some(&json!("eleven")), "qty", BoundsMode::Native)));
        assert!(!ok(max.validate(Some(&json!([11])), "qty", BoundsMode::Native)));
    }

    #[test]
    fn test_is_comparable() {
        assert!(ok(IsComparable::validate(Some(&json!("12")), "qty")));
        let err = IsComparable::validate(Some(&json!("twelve")), "qty").unwrap_err();
        assert_eq!(err.constraint, Some(Constraint::Bounds));
    }

    #[test]
    fn test_length_validators() {
        let min = MinLength(3);
        assert!(min.try_validate(Some(&json!("abc")), "name").unwrap().is_none());
        let err = min.try_validate(Some(&json!("ab")), "name").unwrap().unwrap();
        assert_eq!(err.message, "name should be at least 3 characters");

        let max = MaxLength(2);
        assert!(max.try_validate(Some(&json!([1, 2])), "tags").unwrap().is_none());
        assert!(max.try_validate(Some(&json!([1, 2, 3])), "tags").unwrap().is_some());
    }

    #[test]
    fn test_length_on_number_faults() {
        let fault = MinLength(1).try_validate(Some(&json!(5)), "count").unwrap_err();
        assert!(matches!(
            fault,
            RuleFault::LengthUnavailable { kind: "a number", .. }
        ));

        assert!(MaxLength(1).try_validate(None, "count").is_err());
    }

    #[test]
    fn test_matches() {
        let pattern = Pattern::new(r"^[A-Z]{3}-\d+$");
        let matcher = Matches(&pattern);
        assert!(matcher.try_validate(Some(&json!("ABC-12")), "sku").unwrap().is_none());
        assert!(matcher.try_validate(Some(&json!("abc")), "sku").unwrap().is_some());

        let broken = Pattern::new("([unclosed");
        let fault = Matches(&broken).try_validate(Some(&json!("x")), "sku").unwrap_err();
        assert!(matches!(fault, RuleFault::InvalidPattern { .. }));
    }

    #[test]
    fn test_bounds_mode_from_str() {
        assert_eq!("Numeric".parse::<BoundsMode>(), Ok(BoundsMode::Numeric));
        assert_eq!(" native ".parse::<BoundsMode>(), Ok(BoundsMode::Native));
        assert!("lexical".parse::<BoundsMode>().is_err());
    }
}
