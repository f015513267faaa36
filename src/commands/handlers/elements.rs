//! 元素查找处理器
//!
//! 通过 `querySelectorAll` 在远程页面中查找元素，并用 [`RemoteObjectIterator`] 逐个遍历结果，
//! 在会话的隐式等待时间内重试。

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

use super::{element_reference, parse_reference};
use crate::commands::{CommandKind, CommandRequest};
use crate::remote::{RemoteElement, RemoteObject, RemoteObjectIterator};
use crate::session::Session;
use crate::Error;

/// Lookup strategies, translated to CSS selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Css,
    Id,
    Name,
    TagName,
    ClassName,
}

impl Strategy {
    pub fn parse(using: &str) -> Result<Self, Error> {
        match using {
            "css selector" | "css" => Ok(Strategy::Css),
            "id" => Ok(Strategy::Id),
            "name" => Ok(Strategy::Name),
            "tag name" => Ok(Strategy::TagName),
            "class name" => Ok(Strategy::ClassName),
            other => Err(Error::invalid_argument(format!("Unsupported locator strategy: {}", other))),
        }
    }

    pub fn to_css(self, value: &str) -> String {
        let quoted = value.replace('\\', "\\\\").replace('"', "\\\"");
        match self {
            Strategy::Css => value.to_string(),
            Strategy::Id => format!("[id=\"{}\"]", quoted),
            Strategy::Name => format!("[name=\"{}\"]", quoted),
            Strategy::TagName => value.to_string(),
            Strategy::ClassName => format!(".{}", value.trim()),
        }
    }
}

/// All elements under `root` matching `css`, in document order
pub async fn query_selector_all(root: &RemoteElement, css: &str) -> Result<Vec<RemoteElement>, Error> {
    let literal = serde_json::to_string(css)?;
    let list = root
        .resolve()
        .await?
        .call_object(&format!(".querySelectorAll({})", literal))
        .await?;

    let mut iter = RemoteObjectIterator::over(list).await?;
    let mut elements = Vec::with_capacity(iter.size());
    while iter.has_next() {
        let item = iter.next().await?;
        let object = item.into_object("NodeList item")?;
        let object = RemoteObject::new(object, Arc::clone(root.inspector()));
        elements.push(RemoteElement::from_object(&object).await?);
    }
    Ok(elements)
}

/// Root of the lookup: the current document or the referenced element
async fn lookup_root(session: &Session, request: &CommandRequest) -> Result<RemoteElement, Error> {
    match request.kind {
        CommandKind::FindChildElement | CommandKind::FindChildElements => {
            let node = parse_reference(request.param("reference")?)?;
            let element = RemoteElement::new(node, Arc::clone(session.inspector()));
            if !element.exists().await? {
                return Err(Error::element_not_found(node.to_string()));
            }
            Ok(element)
        }
        _ => session.document().await,
    }
}

/// Run the lookup until something matches or the implicit wait is spent
async fn find_with_wait(
    session: &Session,
    request: &CommandRequest,
    poll: Duration,
) -> Result<Vec<RemoteElement>, Error> {
    let strategy = Strategy::parse(request.string_field("using")?)?;
    let css = strategy.to_css(request.string_field("value")?);
    let deadline = Instant::now() + session.settings().implicit_wait(request.kind);

    loop {
        let root = lookup_root(session, request).await?;
        let found = query_selector_all(&root, &css).await?;
        if !found.is_empty() || Instant::now() >= deadline {
            debug!("{} matched {} elements", css, found.len());
            return Ok(found);
        }
        tokio::time::sleep(poll.min(deadline.saturating_duration_since(Instant::now()))).await;
    }
}

/// 查找单个元素
#[instrument(skip(session, request), fields(session_id = %session.id()))]
pub async fn find_element(session: &Session, request: &CommandRequest, poll: Duration) -> Result<Value, Error> {
    let found = find_with_wait(session, request, poll).await?;
    let first = found.first().ok_or_else(|| {
        Error::element_not_found(format!(
            "{} {}",
            request.string_field("using").unwrap_or_default(),
            request.string_field("value").unwrap_or_default()
        ))
    })?;
    Ok(element_reference(first.node_id()))
}

/// 查找多个元素
#[instrument(skip(session, request), fields(session_id = %session.id()))]
pub async fn find_elements(session: &Session, request: &CommandRequest, poll: Duration) -> Result<Value, Error> {
    let found = find_with_wait(session, request, poll).await?;
    Ok(Value::Array(
        found.iter().map(|e| element_reference(e.node_id())).collect(),
    ))
}
