//! # 命令层
//!
//! 将 WebDriver 风格的请求翻译为对上下文引擎与远程元素 API 的调用，并统一包装为 `{sessionId, status, value}` 响应。
//!
//! ## 模块结构
//! - `request`: 命令类型与请求
//! - `response`: 响应信封与状态码映射
//! - `executor`: 命令分发
//! - `handlers`: 各命令处理器

pub mod request;
pub mod response;
pub mod executor;
pub mod handlers;


pub use request::{CommandKind, CommandRequest};
pub use response::{status, status_for, CommandResponse};
pub use executor::CommandExecutor;
