//! 窗口句柄处理器

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::instrument;

use crate::session::Session;
use crate::Error;

/// 列出宿主上所有页面的句柄（去重）
#[instrument(skip(session), fields(session_id = %session.id()))]
pub async fn get_window_handles(session: &Session) -> Result<Value, Error> {
    let handles: BTreeSet<String> = session
        .host()
        .list_targets()
        .await?
        .into_iter()
        .filter(|target| target.is_page())
        .map(|target| target.target_id)
        .collect();

    Ok(Value::Array(handles.into_iter().map(Value::String).collect()))
}
