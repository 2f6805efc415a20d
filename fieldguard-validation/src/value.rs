//! Loose value semantics for body fields.
//!
//! Request bodies arrive as JSON from clients that treat values loosely: a
//! field may be absent, `0` counts as "not provided", numbers are compared
//! against strings. The helpers here pin down those rules in one place:
//! truthiness, string rendering, numeric coercion, length and ordering
//! against a numeric bound.
//!
//! `None` stands for an absent field throughout.

use serde_json::Value;
use std::cmp::Ordering;

/// Whether a field counts as provided.
///
/// Absent, `null`, `false`, `0` and `""` are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a number the way a JSON client prints it: integral values have
/// no fraction, everything else uses the shortest round-trip form.
///
/// Magnitudes at or above `1e21` or below `1e-6` switch to exponent form
/// with an explicit sign, e.g. `1e+21` and `1.5e-7`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let rendered = format!("{:e}", n);
        match rendered.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => rendered,
        }
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        format_number(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// String form of a field, as pattern and format checks see it.
///
/// Absent renders as `undefined`, `null` as `null`, arrays join their
/// elements with `,` (null elements render empty) and objects render as
/// `[object Object]`.
pub fn to_display_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_to_string(n),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// Numeric coercion of a field. Returns NaN when the value is not a number.
///
/// `null` is 0, booleans are 0/1, strings go through [`parse_number`],
/// arrays are coerced through their string form, objects and absent values
/// are NaN.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Object(_)) => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s),
        Some(array @ Value::Array(_)) => parse_number(&to_display_string(Some(array))),
    }
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let mantissa_ok = all_digits(int_part)
        && frac_part.is_none_or(all_digits)
        && (!int_part.is_empty() || frac_part.is_some_and(|f| !f.is_empty()));

    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !digits.is_empty() && all_digits(digits)
    });

    mantissa_ok && exponent_ok
}

/// Parse a string as a number the lenient way.
///
/// Surrounding whitespace is ignored and an empty string is 0. Accepts
/// signed decimals with optional exponent, `0x`/`0o`/`0b` literals and
/// `Infinity`. Anything else is NaN.
pub fn parse_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let prefixed = s.get(..2).map(str::to_ascii_lowercase);
    match prefixed.as_deref() {
        Some("0x") => return parse_radix(&s[2..], 16),
        Some("0o") => return parse_radix(&s[2..], 8),
        Some("0b") => return parse_radix(&s[2..], 2),
        _ => {}
    }

    if is_decimal_literal(s) {
        s.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Length of a string (in characters) or array. Other kinds have none.
pub fn length(value: Option<&Value>) -> Option<usize> {
    match value {
        Some(Value::String(s)) => Some(s.chars().count()),
        Some(Value::Array(items)) => Some(items.len()),
        _ => None,
    }
}

/// Article-prefixed kind name used in fault messages.
pub fn kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "an absent",
        Some(Value::Null) => "a null",
        Some(Value::Bool(_)) => "a boolean",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "an array",
        Some(Value::Object(_)) => "an object",
    }
}

/// Order a field against a numeric bound the loose way.
///
/// The field is coerced with [`to_number`] before comparing, so `"9"` sorts
/// before `10` and `[5]` before `10`. Values that coerce to NaN (`"abc"`,
/// objects, absent fields) are unordered and never fail a bound.
pub fn native_cmp(value: Option<&Value>, bound: f64) -> Option<Ordering> {
    to_number(value).partial_cmp(&bound)
}

/// Order a field against a numeric bound after numeric coercion.
///
/// Values that do not coerce to a finite number are unordered.
pub fn numeric_cmp(value: Option<&Value>, bound: f64) -> Option<Ordering> {
    let n = to_number(value);
    if n.is_finite() {
        n.partial_cmp(&bound)
    } else {
        None
    }
}
