//! # 远程调试 (Inspector) 层
//!
//! 提供与远程 WebView 的远程调试通道，所有上层模块只通过 [`Inspector`] trait 访问远程页面。
//!
//! ## 主要功能
//! - **WebSocket 连接管理**: 建立和维护与 WebView 调试端口的 WebSocket 连接
//! - **协议通信**: 发送 DOM / Runtime 命令并接收响应
//! - **事件订阅**: 监听页面与 DOM 事件（节点插入、节点移除、页面加载等）
//! - **页面发现**: 通过 HTTP 发现端点列出可调试页面
//!
//! ## 模块结构
//! - `traits`: Inspector 操作的核心 trait 定义
//! - `types`: 协议相关的数据类型
//! - `connection`: WebSocket 连接实现
//! - `client`: Inspector 客户端实现
//! - `host`: 调试宿主（页面发现与连接）
//! - `mock`: 用于测试的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use webview_driver::inspector::{DevToolsHost, InspectorHost};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = DevToolsHost::new("http://localhost:9222");
//! let inspector = host.connect(None).await?;
//!
//! let root = inspector.document_root().await?;
//! println!("Document root: {}", root);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod host;
pub mod mock;

pub use traits::{
    HostVersion, Inspector, InspectorConnection, InspectorError, InspectorEvent, InspectorHost,
    InspectorResponse, RemoteValue, TargetInfo,
};
pub use types::{NodeId, ObjectId};

// Re-export implementation structs
pub use connection::{CommandTimeouts, DevToolsConnection};
pub use client::DevToolsInspector;
pub use host::DevToolsHost;

// Re-export mock for development/testing
pub use mock::{MockInspector, MockInspectorHost};
