//! 配置相关的命令处理器
//!
//! 包括：set_configuration, set_implicit_wait_timeout

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::commands::{CommandKind, CommandRequest};
use crate::session::{Session, IMPLICIT_WAIT};
use crate::Error;

/// 将负载中的每个键写入指定命令的会话配置
#[instrument(skip(session, request), fields(session_id = %session.id()))]
pub async fn set_configuration(session: &Session, request: &CommandRequest) -> Result<Value, Error> {
    let command = CommandKind::from_name(request.param("command")?)?;

    let payload = match &request.payload {
        Value::Object(payload) => payload,
        Value::Null => return Ok(json!({})),
        other => {
            return Err(Error::invalid_argument(format!(
                "Configuration payload must be an object, got {}",
                other
            )))
        }
    };

    for (key, value) in payload {
        debug!("Configure {}: {} = {}", command, key, value);
        session.settings().set(command, key.clone(), value.clone());
    }

    Ok(json!({}))
}

/// 设置元素查找命令的隐式等待（毫秒）
#[instrument(skip(session, request), fields(session_id = %session.id()))]
pub async fn set_implicit_wait_timeout(session: &Session, request: &CommandRequest) -> Result<Value, Error> {
    let ms = request
        .field("ms")
        .and_then(Value::as_f64)
        .filter(|ms| *ms >= 0.0)
        .ok_or_else(|| Error::invalid_argument("Implicit wait requires a non-negative ms"))?;

    for command in CommandKind::ELEMENT_LOOKUPS {
        session.settings().set(command, IMPLICIT_WAIT, json!(ms as u64));
    }

    Ok(json!({}))
}
