//! 表单提交处理器

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use super::parse_reference;
use crate::commands::CommandRequest;
use crate::remote::RemoteElement;
use crate::session::Session;
use crate::Error;

/// 提交元素所在的表单
#[instrument(skip(session, request), fields(session_id = %session.id()))]
pub async fn submit(session: &Session, request: &CommandRequest) -> Result<Value, Error> {
    let node = parse_reference(request.param("reference")?)?;
    let element = RemoteElement::new(node, Arc::clone(session.inspector()));

    if !element.exists().await? {
        return Err(Error::element_not_found(node.to_string()));
    }

    element.submit().await?;
    Ok(json!({}))
}
