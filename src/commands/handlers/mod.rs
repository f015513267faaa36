//! 命令处理器模块
//!
//! 每个处理器都是无状态的薄翻译层：读取路径参数与负载，调用上下文引擎与远程元素 API，返回响应值。

mod session;
mod title;
mod window_handles;
mod is_equal;
mod submit;
mod configuration;
mod frame;
mod elements;

pub use session::*;
pub use title::*;
pub use window_handles::*;
pub use is_equal::*;
pub use submit::*;
pub use configuration::*;
pub use frame::*;
pub use elements::*;

use crate::inspector::NodeId;
use crate::Error;
use serde_json::{json, Value};

/// Key of an element reference in the wire format
pub const ELEMENT_KEY: &str = "ELEMENT";

/// Wire form of an element reference
pub fn element_reference(node: NodeId) -> Value {
    json!({ "ELEMENT": node.to_string() })
}

/// Parse an element reference taken from a path parameter
pub fn parse_reference(reference: &str) -> Result<NodeId, Error> {
    NodeId::parse(reference)
        .ok_or_else(|| Error::invalid_argument(format!("Invalid element reference: {}", reference)))
}
