//! 响应信封与状态码
//!
//! 所有命令都返回 `{sessionId, status, value}`，`status == 0` 表示成功，其余值对应 JSON wire 协议的错误类别。

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::Error;

/// JSON wire protocol status codes
pub mod status {
    pub const SUCCESS: i32 = 0;
    pub const NO_SUCH_SESSION: i32 = 6;
    pub const NO_SUCH_ELEMENT: i32 = 7;
    pub const NO_SUCH_FRAME: i32 = 8;
    pub const UNKNOWN_COMMAND: i32 = 9;
    pub const UNKNOWN_ERROR: i32 = 13;
    pub const JAVASCRIPT_ERROR: i32 = 17;
    pub const TIMEOUT: i32 = 21;
    pub const INVALID_ARGUMENT: i32 = 61;
}

/// 将内部错误映射为协议状态码
pub fn status_for(error: &Error) -> i32 {
    match error {
        Error::SessionNotFound(_) => status::NO_SUCH_SESSION,
        Error::ElementNotFound(_) => status::NO_SUCH_ELEMENT,
        Error::NoSuchFrame(_) | Error::AmbiguousFrame { .. } => status::NO_SUCH_FRAME,
        Error::UnknownCommand(_) => status::UNKNOWN_COMMAND,
        Error::ScriptExecutionFailed(_) => status::JAVASCRIPT_ERROR,
        Error::Timeout(_) => status::TIMEOUT,
        Error::InvalidArgument(_) | Error::Serialization(_) => status::INVALID_ARGUMENT,
        _ => status::UNKNOWN_ERROR,
    }
}

/// 响应信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub status: i32,
    pub value: Value,
}

impl CommandResponse {
    /// 成功响应
    pub fn success(session_id: Option<String>, value: Value) -> Self {
        Self {
            session_id,
            status: status::SUCCESS,
            value,
        }
    }

    /// 错误响应，`value.message` 携带错误描述
    pub fn failure(session_id: Option<String>, error: &Error) -> Self {
        Self {
            session_id,
            status: status_for(error),
            value: json!({ "message": error.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == status::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::NodeId;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&Error::session_not_found("x")), 6);
        assert_eq!(status_for(&Error::element_not_found("x")), 7);
        assert_eq!(status_for(&Error::no_such_frame("x")), 8);
        assert_eq!(status_for(&Error::ambiguous_frame(NodeId(2), 3)), 8);
        assert_eq!(status_for(&Error::unknown_command("x")), 9);
        assert_eq!(status_for(&Error::remote("x")), 13);
        assert_eq!(status_for(&Error::script_execution_failed("x")), 17);
        assert_eq!(status_for(&Error::timeout("x")), 21);
        assert_eq!(status_for(&Error::invalid_argument("x")), 61);
    }

    #[test]
    fn test_envelope_shape() {
        let response = CommandResponse::success(Some("s-1".to_string()), json!("Title"));
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded, json!({ "sessionId": "s-1", "status": 0, "value": "Title" }));

        let failure = CommandResponse::failure(None, &Error::timeout("Document not ready"));
        let encoded = serde_json::to_value(&failure).unwrap();
        assert_eq!(encoded["sessionId"], Value::Null);
        assert_eq!(encoded["status"], 21);
        assert!(encoded["value"]["message"].as_str().unwrap().contains("Document not ready"));
        assert!(!failure.is_success());
    }
}
