//! 帧切换处理器

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{query_selector_all, ELEMENT_KEY};
use crate::commands::CommandRequest;
use crate::remote::RemoteElement;
use crate::session::Session;
use crate::Error;

const FRAMES: &str = "iframe, frame";

/// 切换当前帧
///
/// `id` 为 null 时回到主文档；为元素引用、序号或 name/id 时进入对应 iframe。
#[instrument(skip(session, request), fields(session_id = %session.id()))]
pub async fn switch_to_frame(session: &Session, request: &CommandRequest) -> Result<Value, Error> {
    let id = request.field("id").cloned().unwrap_or(Value::Null);

    if id.is_null() {
        session.document().await?;
        session.context().set_current_frame(None, None, None).await;
        debug!("Switched to default content");
        return Ok(json!({}));
    }

    let iframe = locate_frame(session, &id).await?;
    let document = iframe.content_document().await?;
    let window = iframe.content_window().await?;
    debug!("Switching to frame {}", iframe.node_id());

    session
        .context()
        .set_current_frame(Some(iframe), Some(document), Some(window))
        .await;
    Ok(json!({}))
}

async fn locate_frame(session: &Session, id: &Value) -> Result<RemoteElement, Error> {
    if let Some(reference) = id.get(ELEMENT_KEY).and_then(Value::as_str) {
        let node = super::parse_reference(reference)?;
        let element = RemoteElement::new(node, Arc::clone(session.inspector()));
        if !element.exists().await? {
            return Err(Error::no_such_frame(format!("Frame element {} is gone", node)));
        }
        return Ok(element);
    }

    let document = session.document().await?;
    let frames = query_selector_all(&document, FRAMES).await?;

    if let Some(index) = id.as_u64() {
        return frames
            .into_iter()
            .nth(index as usize)
            .ok_or_else(|| Error::no_such_frame(format!("No frame at index {}", index)));
    }

    if let Some(name) = id.as_str() {
        for frame in frames {
            let object = frame.resolve().await?;
            let frame_name = object.call(".name").await?;
            let frame_id = object.call(".id").await?;
            let matches = |v: &crate::inspector::RemoteValue| {
                v.as_value().and_then(Value::as_str) == Some(name)
            };
            if matches(&frame_name) || matches(&frame_id) {
                return Ok(frame);
            }
        }
        return Err(Error::no_such_frame(format!("No frame named {}", name)));
    }

    Err(Error::invalid_argument(format!("Invalid frame id: {}", id)))
}
