//! End-to-end integration tests
//!
//! These tests drive the HTTP endpoint against a mock web view reached over
//! the real discovery and WebSocket transport.

mod common;

use axum::http::StatusCode;
use common::{call, eventually, new_session, setup_app};
use mock_devtools::{MockDevToolsServer, PAGE_ID};
use serde_json::{json, Value};
use std::sync::Arc;
use webview_driver::context::Readiness;
use webview_driver::inspector::{DevToolsHost, NodeId};
use webview_driver::session::SessionManager;

async fn start() -> (MockDevToolsServer, Arc<webview_driver::session::SessionManagerImpl>, axum::Router) {
    let server = MockDevToolsServer::start().await.unwrap();
    let host = Arc::new(DevToolsHost::new(server.http_endpoint()));
    let (manager, app) = setup_app(host);
    (server, manager, app)
}

/// Test 1: Session lifecycle over the real transport
#[tokio::test]
async fn test_session_lifecycle() {
    let (server, manager, app) = start().await;

    let session_id = new_session(&app).await;
    assert_eq!(manager.session_count(), 1);
    assert!(server.page().calls().contains(&"DOM.enable".to_string()));

    let (code, body) = call(&app, "GET", &format!("/session/{}", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["value"]["version"], "MobileSafari/17.0");

    let (code, body) = call(&app, "GET", &format!("/session/{}/window_handles", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["value"], json!([PAGE_ID]));

    let (code, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["value"], "Mock Page");

    let (code, _) = call(&app, "DELETE", &format!("/session/{}", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(manager.session_count(), 0);

    let (code, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 6);
}

/// Test 2: The current frame follows an iframe that is replaced in place
#[tokio::test]
async fn test_frame_replacement_is_followed() {
    let (server, manager, app) = start().await;
    let page = server.page();
    page.add_iframe(10, 11, "Inner");

    let session_id = new_session(&app).await;
    let (code, body) = call(
        &app,
        "POST",
        &format!("/session/{}/frame", session_id),
        json!({ "id": { "ELEMENT": "10" } }),
    )
    .await;
    assert_eq!(code, StatusCode::OK, "{}", body);

    let (_, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(body["value"], "Inner");

    let session = manager.get_session(&session_id).await.unwrap();
    let context = Arc::clone(session.context());

    page.detach_iframe(10, 5);
    assert!(
        eventually(|| {
            let context = Arc::clone(&context);
            async move { context.readiness().await == Readiness::AwaitingReplacement { parent: NodeId(5) } }
        })
        .await
    );

    page.attach_iframe(20, 21, 5, "Replaced");
    let (code, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::OK, "{}", body);
    assert_eq!(body["value"], "Replaced");

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.document, Some(NodeId(21)));
    assert_eq!(snapshot.readiness, Readiness::Ready);
}

/// Test 3: A replacement that was announced first is picked up on removal
#[tokio::test]
async fn test_replacement_before_removal() {
    let (server, manager, app) = start().await;
    let page = server.page();
    page.add_iframe(10, 11, "Inner");

    let session_id = new_session(&app).await;
    call(
        &app,
        "POST",
        &format!("/session/{}/frame", session_id),
        json!({ "id": { "ELEMENT": "10" } }),
    )
    .await;

    let session = manager.get_session(&session_id).await.unwrap();
    let context = Arc::clone(session.context());

    page.attach_iframe(30, 31, 5, "Early");
    assert!(
        eventually(|| {
            let context = Arc::clone(&context);
            async move { context.snapshot().await.pending_insertions == 1 }
        })
        .await
    );

    page.detach_iframe(10, 5);
    assert!(
        eventually(|| {
            let context = Arc::clone(&context);
            async move { context.snapshot().await.iframe == Some(NodeId(30)) }
        })
        .await
    );

    let (_, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(body["value"], "Early");
    assert_eq!(context.snapshot().await.pending_insertions, 0);
}

/// Test 4: A removed frame without replacement times out once, then recovers
#[tokio::test]
async fn test_missing_replacement_times_out() {
    let (server, manager, app) = start().await;
    let page = server.page();
    page.add_iframe(10, 11, "Inner");

    let session_id = new_session(&app).await;
    call(
        &app,
        "POST",
        &format!("/session/{}/frame", session_id),
        json!({ "id": { "ELEMENT": "10" } }),
    )
    .await;

    let session = manager.get_session(&session_id).await.unwrap();
    let context = Arc::clone(session.context());

    page.detach_iframe(10, 5);
    assert!(
        eventually(|| {
            let context = Arc::clone(&context);
            async move { context.readiness().await != Readiness::Ready }
        })
        .await
    );

    let (code, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 21);
    assert_eq!(context.readiness().await, Readiness::Ready);

    let (code, body) = call(&app, "POST", &format!("/session/{}/frame", session_id), json!({ "id": null })).await;
    assert_eq!(code, StatusCode::OK, "{}", body);
    let (_, body) = call(&app, "GET", &format!("/session/{}/title", session_id), Value::Null).await;
    assert_eq!(body["value"], "Mock Page");
}

/// Test 5: A reload keeps the current frame while it still resolves
#[tokio::test]
async fn test_reload_keeps_live_frame() {
    let (server, manager, app) = start().await;
    let page = server.page();
    page.add_iframe(10, 11, "Inner");

    let session_id = new_session(&app).await;
    call(
        &app,
        "POST",
        &format!("/session/{}/frame", session_id),
        json!({ "id": { "ELEMENT": "10" } }),
    )
    .await;

    let session = manager.get_session(&session_id).await.unwrap();
    let context = Arc::clone(session.context());

    let waiter = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.wait_for_load_event().await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    page.emit("Page.loadEventFired", json!({ "timestamp": 1.0 }));
    assert!(waiter.await.unwrap().is_ok());

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, Some(NodeId(10)));
    assert_eq!(snapshot.document, Some(NodeId(11)));
}

/// Test 6: Unknown routes and malformed frame ids
#[tokio::test]
async fn test_protocol_errors() {
    let (_server, _manager, app) = start().await;
    let session_id = new_session(&app).await;

    let (code, body) = call(&app, "POST", &format!("/session/{}/url", session_id), json!({})).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 9);

    let (code, body) = call(
        &app,
        "POST",
        &format!("/session/{}/frame", session_id),
        json!({ "id": { "ELEMENT": "99" } }),
    )
    .await;
    assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 8);
}
