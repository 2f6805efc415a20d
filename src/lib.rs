// fieldguard - declarative per-route request field validation
//
// Rules are declared per route, evaluated in one pass over path parameters and
// JSON body fields, and every violation is reported in a structured 400.

// Re-export core functionality
pub use fieldguard_core::*;

// Logging facade
pub use fieldguard_log;

// Re-export optional crates
#[cfg(feature = "validation")]
pub use fieldguard_validation;

#[cfg(feature = "config")]
pub use fieldguard_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Error, HttpRequest, HttpResponse, HttpStatus, Middleware, MiddlewareChain, Next, handler,
    };

    #[cfg(feature = "validation")]
    pub use fieldguard_validation::{
        BoundsMode, CustomCheck, GuardSettings, IdentifierCheck, IdentifierFn, ObjectIdFormat,
        Rule, RuleEvaluator, RuleFault, RuleTable, RuleValidationMiddleware, ValidationError,
        ValidationErrors, Verdict, validator,
    };
}
