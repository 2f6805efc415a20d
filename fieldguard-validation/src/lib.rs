//! Per-route request field validation
//!
//! A [`RuleTable`] maps route keys to ordered lists of [`Rule`]s. A
//! [`RuleEvaluator`] checks one request against its route's rules in a single
//! pass and reports every violation it finds, not just the first.
//!
//! # Examples
//!
//! ## Evaluating a request
//!
//! ```
//! use fieldguard_validation::{Rule, RuleEvaluator, RuleTable, Verdict};
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! let table = RuleTable::new().route(
//!     "/orders",
//!     vec![Rule::new("amount").required("amount required").min(0.0).decimal2()],
//! );
//! let evaluator = RuleEvaluator::new(table);
//!
//! let body = json!({"amount": -1.999});
//! let verdict = evaluator
//!     .evaluate("/orders", &HashMap::new(), body.as_object().unwrap())
//!     .unwrap();
//!
//! let errors = verdict.errors().unwrap();
//! assert_eq!(
//!     errors.pairs(),
//!     vec![
//!         ("amount", "amount should be at least 0"),
//!         ("amount", "amount should have up to 2 decimal places"),
//!     ]
//! );
//! ```
//!
//! ## Loading rules
//!
//! ```
//! use fieldguard_validation::RuleTable;
//!
//! let table = RuleTable::from_json_str(r#"{
//!     "/users": [
//!         {"field": "email", "message": "email required", "email": true},
//!         {"field": "username", "minLength": 3, "pattern": "^[a-z0-9_]+$"}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(table.get("/users").unwrap().len(), 2);
//! ```
//!
//! ## Single validators
//!
//! ```
//! use fieldguard_validation::{DecimalPlaces, IsBoolean, IsEmail};
//! use serde_json::json;
//!
//! assert!(DecimalPlaces::Two.validate(Some(&json!("12.34")), "price").is_ok());
//! assert!(DecimalPlaces::Two.validate(Some(&json!("12.345")), "price").is_err());
//! assert!(IsEmail::validate(Some(&json!("a@b.co")), "email").is_ok());
//! assert!(IsBoolean::validate(Some(&json!("true")), "flag").is_err());
//! ```

mod errors;
mod evaluator;
mod middleware;
mod rules;
mod settings;
mod traits;
mod validators;
pub mod value;

pub use errors::*;
pub use evaluator::*;
pub use middleware::*;
pub use rules::*;
pub use settings::*;
pub use traits::*;
pub use validators::*;
