//! 会话相关的命令处理器
//!
//! 包括：new_session, delete_session, get_capabilities

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::commands::CommandRequest;
use crate::session::{Session, SessionManager};
use crate::Error;

/// 创建新会话，返回会话与其能力
#[instrument(skip(manager, request))]
pub async fn new_session(manager: &dyn SessionManager, request: &CommandRequest) -> Result<Arc<Session>, Error> {
    let desired = request
        .field("desiredCapabilities")
        .cloned()
        .unwrap_or_else(|| json!({}));

    let session = manager.create_session(desired).await?;
    info!(session_id = %session.id(), "Session created");
    Ok(session)
}

/// 关闭会话
#[instrument(skip(manager))]
pub async fn delete_session(manager: &dyn SessionManager, session_id: &str) -> Result<Value, Error> {
    manager.delete_session(session_id).await?;
    info!(session_id = %session_id, "Session deleted");
    Ok(Value::Null)
}

/// 返回会话能力
pub async fn get_capabilities(session: &Session) -> Result<Value, Error> {
    Ok(session.capabilities().clone())
}
