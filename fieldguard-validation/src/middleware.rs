// Request validation middleware

use crate::{RuleEvaluator, RuleTable, Verdict};
use async_trait::async_trait;
use fieldguard_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use fieldguard_log::error;
use serde_json::{Map, Value};
use std::sync::Arc;

type RouteKeyFn = Arc<dyn Fn(&HttpRequest) -> String + Send + Sync>;

/// Middleware that validates path parameters and JSON body fields before the
/// request reaches its handler
///
/// Rejections answer `400` with `{"errors": [{"field", "message"}, ...]}`;
/// the handler is not called. Rule faults surface as [`Error::Internal`].
#[derive(Clone)]
pub struct RuleValidationMiddleware {
    evaluator: RuleEvaluator,
    route_key: Option<RouteKeyFn>,
}

impl RuleValidationMiddleware {
    pub fn new(evaluator: RuleEvaluator) -> Self {
        Self {
            evaluator,
            route_key: None,
        }
    }

    /// Derive the route key from the request instead of using its path
    pub fn with_route_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&HttpRequest) -> String + Send + Sync + 'static,
    {
        self.route_key = Some(Arc::new(key));
        self
    }

    pub fn evaluator(&self) -> &RuleEvaluator {
        &self.evaluator
    }

    pub fn route_key(&self, req: &HttpRequest) -> String {
        match self.route_key {
            Some(ref key) => key(req),
            None => req.path.clone(),
        }
    }

    /// Body fields of a request
    ///
    /// An empty body or a JSON body that is not an object has no fields.
    pub fn body_fields(req: &HttpRequest) -> Result<Map<String, Value>, Error> {
        if req.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        let parsed: Value = serde_json::from_slice(&req.body)
            .map_err(|e| Error::BadRequest(format!("Invalid JSON: {}", e)))?;

        Ok(match parsed {
            Value::Object(fields) => fields,
            _ => Map::new(),
        })
    }

    /// Evaluate a request without forwarding it
    pub fn check(&self, req: &HttpRequest) -> Result<Verdict, Error> {
        let route = self.route_key(req);
        let fields = Self::body_fields(req)?;

        self.evaluator
            .evaluate(&route, &req.path_params, &fields)
            .map_err(|fault| {
                error!(route = route, field = fault.field(); "Rule configuration fault: {}", fault);
                Error::from(fault)
            })
    }
}

#[async_trait]
impl Middleware for RuleValidationMiddleware {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        match self.check(&req)? {
            Verdict::Continue => next(req).await,
            Verdict::Reject(errors) => errors.into_response(),
        }
    }
}

/// Validation middleware over `table` with default settings
pub fn validator(table: RuleTable) -> RuleValidationMiddleware {
    RuleValidationMiddleware::new(RuleEvaluator::new(table))
}
