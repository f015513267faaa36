//! # 会话管理层
//!
//! 管理自动化会话的生命周期：每个会话绑定一个远程 WebView 页面、一个上下文同步引擎和一份按命令划分的配置。
//!
//! ## 主要功能
//! - **会话创建**: 通过 Inspector 宿主连接页面并启动事件泵
//! - **会话配置**: 每个会话独立的命令配置（如隐式等待），互不干扰
//! - **会话清理**: 自动清理断开连接或空闲过期的会话
//! - **并发安全**: 所有操作都是线程安全的，支持并发访问
//!
//! ## 模块结构
//! - `traits`: 会话管理的核心 trait 定义
//! - `manager`: 会话管理器实现
//! - `webview`: 单个会话
//! - `settings`: 会话级命令配置
//!
//! ## 使用示例
//! ```rust,no_run
//! use webview_driver::session::{SessionManager, SessionManagerImpl};
//! use webview_driver::inspector::{DevToolsHost, InspectorHost};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = SessionManagerImpl::new(|| {
//!     Ok(Arc::new(DevToolsHost::new("http://localhost:9222")) as Arc<dyn InspectorHost>)
//! });
//!
//! let session = manager.create_session(serde_json::json!({})).await?;
//! let document = session.document().await?;
//! println!("Document: {}", document.node_id());
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod manager;
pub mod webview;
pub mod settings;


pub use traits::SessionManager;
pub use manager::SessionManagerImpl;
pub use webview::Session;
pub use settings::{SessionSettings, IMPLICIT_WAIT};
