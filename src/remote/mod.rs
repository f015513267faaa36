//! # 远程对象句柄
//!
//! 对远程页面中 DOM 节点与 JavaScript 对象的轻量引用，所有操作都通过 [`Inspector`](crate::inspector::Inspector) 完成。
//!
//! ## 模块结构
//! - `element`: DOM 节点句柄（iframe、document 等）
//! - `object`: JavaScript 对象句柄（window、NodeList 等）
//! - `iterator`: 远程集合的惰性遍历器

pub mod element;
pub mod object;
pub mod iterator;

pub use element::RemoteElement;
pub use object::RemoteObject;
pub use iterator::RemoteObjectIterator;

/// Function declaration returning `this` followed by `expression`
///
/// `accessor(".title")` reads a property, `accessor("[2]")` an indexed item.
pub fn accessor(expression: &str) -> String {
    format!("function(){{ return this{}; }}", expression)
}
