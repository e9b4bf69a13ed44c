//! Shared helpers for driving the real router with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use questflow_api::{create_api_router, ApiConfig, AppState, StoreBackend};
use questflow_core::RewardsConfig;
use questflow_storage::QuestStore;
use serde_json::Value;
use tower::ServiceExt;

pub const LINK_BASE: &str = "https://questflow.test";

pub fn rewards() -> RewardsConfig {
    RewardsConfig {
        public_base_url: LINK_BASE.to_string(),
        ..RewardsConfig::default()
    }
}

pub fn app_with(store: Arc<dyn QuestStore>) -> Router {
    let config = ApiConfig {
        store: StoreBackend::Memory,
        ..ApiConfig::default()
    };
    create_api_router(AppState::new(store, rewards()), &config)
}

pub fn app() -> Router {
    app_with(Arc::new(questflow_storage::InMemoryStore::new()))
}

/// Send a request and return the status and the body parsed as JSON
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::POST, uri, None).await
}

/// Record `count` referrals for `referrer` through the API.
pub async fn refer(app: &Router, referrer: &str, count: usize, offset: usize) {
    for i in offset..offset + count {
        let (status, body) = post(
            app,
            "/api/referrals/event",
            serde_json::json!({
                "referrerUserId": referrer,
                "referredUserId": format!("{}-friend-{}", referrer, i),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "referral failed: {}", body);
    }
}

pub fn error_code(body: &Value) -> &str {
    body["code"].as_str().unwrap_or_default()
}

pub fn amount(body: &Value, field: &str) -> f64 {
    body[field]
        .as_f64()
        .unwrap_or_else(|| panic!("{} is not a number in {}", field, body))
}
