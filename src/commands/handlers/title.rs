//! 标题读取处理器

use serde_json::Value;
use tracing::{debug, instrument};

use crate::session::Session;
use crate::Error;

/// 读取当前文档标题，页面加载中时先等待加载完成
#[instrument(skip(session), fields(session_id = %session.id()))]
pub async fn get_title(session: &Session) -> Result<Value, Error> {
    let context = session.context();
    if context.is_page_loading() {
        debug!("Title requested while the page is loading");
        context.wait_for_page_to_load().await?;
    }

    let document = session.document().await?;
    let title = document.call(".title").await?;

    match title.as_value() {
        Some(Value::String(title)) => {
            debug!("Title: {}", title);
            Ok(Value::String(title.clone()))
        }
        Some(Value::Null) => Ok(Value::String(String::new())),
        _ => Err(Error::remote(format!("Unexpected title value: {:?}", title))),
    }
}
