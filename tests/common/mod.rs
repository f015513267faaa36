//! Common test utilities
//!
//! This module provides shared test helpers and fixtures for all integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use webview_driver::commands::CommandExecutor;
use webview_driver::context::ContextTimeouts;
use webview_driver::inspector::InspectorHost;
use webview_driver::server::{self, AppState};
use webview_driver::session::SessionManagerImpl;

/// Context timeouts short enough for tests
pub fn fast_timeouts() -> ContextTimeouts {
    ContextTimeouts {
        document_poll_interval: Duration::from_millis(10),
        document_poll_retries: 50,
        load_event_timeout: Duration::from_millis(500),
    }
}

/// Session manager attached to `host`, and the router serving it
pub fn setup_app(host: Arc<dyn InspectorHost>) -> (Arc<SessionManagerImpl>, Router) {
    let manager = Arc::new(SessionManagerImpl::with_host(host).with_timeouts(fast_timeouts()));
    let executor = CommandExecutor::new(manager.clone()).with_implicit_wait_poll(Duration::from_millis(10));
    let router = server::router(AppState::new(executor));
    (manager, router)
}

/// Send one request through the router and decode the envelope
pub async fn call(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let body = if body.is_null() {
        Body::empty()
    } else {
        Body::from(body.to_string())
    };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let code = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (code, serde_json::from_slice(&bytes).unwrap())
}

/// Open a session and return its id
pub async fn new_session(app: &Router) -> String {
    let (code, body) = call(app, "POST", "/session", serde_json::json!({ "desiredCapabilities": {} })).await;
    assert_eq!(code, StatusCode::OK, "new session failed: {}", body);
    body["sessionId"].as_str().unwrap().to_string()
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
