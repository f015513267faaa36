//! # HTTP 命令端点
//!
//! 将 JSON wire 协议的 HTTP 路由映射为 [`CommandKind`]，交给 [`CommandExecutor`] 执行，
//! 并以 `{sessionId, status, value}` 信封返回结果。
//!
//! ## 状态码
//! - 成功返回 HTTP 200
//! - 会话不存在或命令未知返回 HTTP 404
//! - 其余失败返回 HTTP 500，协议状态码位于信封的 `status` 字段

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, MethodFilter, MethodRouter};
use axum::Router;
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::commands::{status, CommandExecutor, CommandKind, CommandRequest, CommandResponse};
use crate::Error;

/// Shared state of the HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub executor: CommandExecutor,
}

impl AppState {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }
}

/// Route table: method, path pattern and the command it carries
pub const ROUTES: &[(Verb, &str, CommandKind)] = &[
    (Verb::Post, "/session", CommandKind::NewSession),
    (Verb::Get, "/session/{sessionId}", CommandKind::GetCapabilities),
    (Verb::Delete, "/session/{sessionId}", CommandKind::DeleteSession),
    (Verb::Get, "/session/{sessionId}/title", CommandKind::GetTitle),
    (Verb::Get, "/session/{sessionId}/window_handles", CommandKind::GetWindowHandles),
    (
        Verb::Get,
        "/session/{sessionId}/element/{reference}/equals/{other}",
        CommandKind::IsEqual,
    ),
    (Verb::Post, "/session/{sessionId}/element/{reference}/submit", CommandKind::Submit),
    (
        Verb::Post,
        "/session/{sessionId}/configure/command/{command}",
        CommandKind::SetConfiguration,
    ),
    (
        Verb::Post,
        "/session/{sessionId}/timeouts/implicit_wait",
        CommandKind::SetImplicitWaitTimeout,
    ),
    (Verb::Post, "/session/{sessionId}/frame", CommandKind::SwitchToFrame),
    (Verb::Post, "/session/{sessionId}/element", CommandKind::FindElement),
    (Verb::Post, "/session/{sessionId}/elements", CommandKind::FindElements),
    (
        Verb::Post,
        "/session/{sessionId}/element/{reference}/element",
        CommandKind::FindChildElement,
    ),
    (
        Verb::Post,
        "/session/{sessionId}/element/{reference}/elements",
        CommandKind::FindChildElements,
    ),
];

/// HTTP methods used by the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Delete,
}

impl Verb {
    fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Delete => MethodFilter::DELETE,
        }
    }
}

/// Build the router with every command route plus `/status`
pub fn router(state: AppState) -> Router {
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();

    for &(verb, path, kind) in ROUTES {
        let entry = by_path.remove(path).unwrap_or_default();
        by_path.insert(path, command_route(entry, verb, kind));
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, route)| router.route(path, route))
        .route("/status", get(status_handler))
        .fallback(unknown_route)
        .with_state(state)
}

fn command_route(route: MethodRouter<AppState>, verb: Verb, kind: CommandKind) -> MethodRouter<AppState> {
    if kind.needs_session() {
        route.on(
            verb.filter(),
            move |State(state): State<AppState>, Path(params): Path<HashMap<String, String>>, body: Bytes| async move {
                dispatch(state, kind, params, body).await
            },
        )
    } else {
        route.on(verb.filter(), move |State(state): State<AppState>, body: Bytes| async move {
            dispatch(state, kind, HashMap::new(), body).await
        })
    }
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn dispatch(
    state: AppState,
    kind: CommandKind,
    params: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let session_id = params.get("sessionId").cloned();

    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(e) => return envelope(CommandResponse::failure(session_id, &e), &e),
    };
    debug!("{} {:?}", kind, params);

    let mut request = CommandRequest::new(kind).with_payload(payload);
    request.params = params;

    let response = state.executor.execute(request).await;
    let code = http_status(response.status);
    (code, Json(response)).into_response()
}

fn parse_body(body: &[u8]) -> Result<Value, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

fn http_status(wire_status: i32) -> StatusCode {
    match wire_status {
        status::SUCCESS => StatusCode::OK,
        status::NO_SUCH_SESSION | status::UNKNOWN_COMMAND => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn envelope(response: CommandResponse, error: &Error) -> Response {
    debug!("Rejected request: {}", error);
    let code = http_status(response.status);
    (code, Json(response)).into_response()
}

/// GET /status
async fn status_handler(State(state): State<AppState>) -> Json<CommandResponse> {
    Json(CommandResponse::success(
        None,
        json!({
            "build": { "version": crate::VERSION },
            "sessions": state.executor.manager().session_count(),
        }),
    ))
}

async fn unknown_route(uri: axum::http::Uri) -> Response {
    let error = Error::unknown_command(uri.path());
    envelope(CommandResponse::failure(None, &error), &error)
}
