//! Integration tests for common fieldguard workflows.
//!
//! These run the validation middleware inside a middleware chain the way a
//! host application would.

#![cfg(feature = "validation")]

use async_trait::async_trait;
use fieldguard::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// Helpers
// =============================================================================

fn orders_table() -> RuleTable {
    RuleTable::new().route(
        "/orders",
        vec![Rule::new("amount").required("amount required").min(0.0).decimal2()],
    )
}

#[derive(Debug, Deserialize)]
struct Order {
    amount: f64,
}

fn order_handler(calls: Arc<AtomicUsize>) -> fieldguard::HandlerFn {
    handler(move |req: HttpRequest| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let order: Order = req.json()?;
            HttpResponse::ok().with_json(&json!({"charged": order.amount}))
        }
    })
}

/// Records the status of every response passing back through it
struct StatusRecorder(Arc<AtomicUsize>);

#[async_trait]
impl Middleware for StatusRecorder {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let response = next(req).await?;
        self.0.store(response.status as usize, Ordering::SeqCst);
        Ok(response)
    }
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn test_valid_order_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(validator(orders_table()));

    let req = HttpRequest::new("POST", "/orders")
        .with_json(&json!({"amount": 10.50}))
        .unwrap();
    let response = chain.apply(req, order_handler(calls.clone())).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let body: Value = response.json().unwrap();
    assert_eq!(body["charged"], 10.5);
}

#[tokio::test]
async fn test_invalid_order_lists_every_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(AtomicUsize::new(0));

    let mut chain = MiddlewareChain::new();
    chain.use_middleware(StatusRecorder(seen.clone()));
    chain.use_middleware(validator(orders_table()));

    let req = HttpRequest::new("POST", "/orders")
        .with_json(&json!({"amount": -1.999}))
        .unwrap();
    let response = chain.apply(req, order_handler(calls.clone())).await.unwrap();

    assert_eq!(response.status, 400);
    assert_eq!(seen.load(Ordering::SeqCst), 400);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        response.headers.get("Content-Type"),
        Some(&"application/json".to_string())
    );

    let body: Value = response.json().unwrap();
    assert_eq!(
        body,
        json!({"errors": [
            {"field": "amount", "message": "amount should be at least 0"},
            {"field": "amount", "message": "amount should have up to 2 decimal places"}
        ]})
    );
}

#[tokio::test]
async fn test_missing_amount_reports_required_only() {
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(validator(orders_table()));

    let req = HttpRequest::new("POST", "/orders")
        .with_json(&json!({"note": "no amount"}))
        .unwrap();
    let response = chain
        .apply(req, order_handler(Arc::new(AtomicUsize::new(0))))
        .await
        .unwrap();

    let body: Value = response.json().unwrap();
    assert_eq!(
        body,
        json!({"errors": [{"field": "amount", "message": "amount required"}]})
    );
}

#[tokio::test]
async fn test_unvalidated_route_passes_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(validator(orders_table()));

    let req = HttpRequest::new("POST", "/refunds")
        .with_param("id", "not-an-object-id")
        .with_json(&json!({"amount": 1}))
        .unwrap();
    let response = chain.apply(req, order_handler(calls.clone())).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rule_fault_surfaces_as_server_error() {
    let table = RuleTable::new().route("/orders", vec![Rule::new("amount").min_length(1)]);
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(validator(table));

    let req = HttpRequest::new("POST", "/orders")
        .with_json(&json!({"amount": 12}))
        .unwrap();
    let err = chain
        .apply(req, order_handler(Arc::new(AtomicUsize::new(0))))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert_eq!(HttpResponse::from(err).status, 500);
}

// =============================================================================
// Configuration
// =============================================================================

#[cfg(feature = "config")]
#[tokio::test]
async fn test_rules_loaded_from_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[["/orders/:id"]]
field = "amount"
requiredMessage = "amount required"
min = 0
decimal2 = true
"#
    )
    .unwrap();

    let settings = GuardSettings {
        rules_path: Some(file.path().to_path_buf()),
        bounds: BoundsMode::Numeric,
    };
    let middleware = RuleValidationMiddleware::new(RuleEvaluator::from_settings(&settings).unwrap())
        .with_route_key(|req: &HttpRequest| match req.param("id") {
            Some(id) => req.path.replace(id.as_str(), ":id"),
            None => req.path.clone(),
        });

    let mut chain = MiddlewareChain::new();
    chain.use_middleware(middleware);

    let req = HttpRequest::new("PUT", "/orders/zzz")
        .with_param("id", "zzz")
        .with_json(&json!({"amount": "abc"}))
        .unwrap();
    let response = chain
        .apply(req, order_handler(Arc::new(AtomicUsize::new(0))))
        .await
        .unwrap();

    let body: Value = response.json().unwrap();
    assert_eq!(
        body,
        json!({"errors": [
            {"field": "id", "message": "Invalid ObjectId format"},
            {"field": "amount", "message": "amount must be numeric to compare against its bounds"},
            {"field": "amount", "message": "amount should have up to 2 decimal places"}
        ]})
    );
}

#[cfg(feature = "config")]
#[test]
fn test_config_loader_reexport() {
    use fieldguard::fieldguard_config::{ConfigLoader, FileFormat};

    let value = ConfigLoader::new(FileFormat::Json)
        .parse(r#"{"/ping": []}"#)
        .unwrap();
    let table = RuleTable::from_value(value).unwrap();
    assert_eq!(table.get("/ping").map(<[Rule]>::len), Some(0));
}

// =============================================================================
// Status and error mapping
// =============================================================================

#[test]
fn test_error_status_codes() {
    assert_eq!(Error::BadRequest("bad".into()).status_code(), 400);
    assert_eq!(Error::Internal("boom".into()).status_code(), 500);
    assert_eq!(HttpStatus::BadRequest.code(), 400);
    assert!(HttpStatus::BadRequest.is_client_error());
}
