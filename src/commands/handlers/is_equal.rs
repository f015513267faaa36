//! 元素比较处理器

use serde_json::Value;

use crate::commands::CommandRequest;
use crate::Error;

/// 比较两个元素引用是否指向同一节点
pub async fn is_equal(request: &CommandRequest) -> Result<Value, Error> {
    let reference = parse_integer(request.param("reference")?)?;
    let other = parse_integer(request.param("other")?)?;
    Ok(Value::Bool(reference == other))
}

fn parse_integer(reference: &str) -> Result<i64, Error> {
    reference
        .trim()
        .parse()
        .map_err(|_| Error::invalid_argument(format!("Element reference is not an integer: {}", reference)))
}
