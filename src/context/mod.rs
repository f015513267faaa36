//! # 浏览上下文同步引擎
//!
//! 维护会话当前的 window / document / iframe，并把异步到达的帧生命周期事件与命令线程的同步读取协调起来。
//!
//! ## 主要功能
//! - **帧替换协调**: 旧 iframe 被移除与新 iframe 被插入的事件可以任意顺序到达
//! - **有界等待**: `get_document` 以固定间隔轮询，超时后自愈并返回 Timeout
//! - **页面加载信号**: 独立于上下文锁的加载等待/通知
//! - **事件泵**: 将 Inspector 事件按到达顺序送入引擎
//!
//! ## 模块结构
//! - `events`: 事件模型（DOM 变更与页面生命周期）
//! - `ledger`: 尚未配对的 iframe 插入事件缓冲
//! - `load`: 页面加载等待原语
//! - `engine`: 上下文状态机
//! - `pump`: 事件泵

pub mod events;
pub mod ledger;
pub mod load;
pub mod engine;
pub mod pump;

#[cfg(test)]
mod tests;

pub use engine::{AmbiguousReplacement, ContextSnapshot, ContextTimeouts, DomContext, Readiness};
pub use events::{DomEvent, FrameInsertion, PageEvent};
pub use ledger::{EntryId, LedgerEntry, PendingFrameLedger};
pub use load::PageLoadSignal;
pub use pump::EventPump;
