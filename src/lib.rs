//! Webview-Driver: WebDriver command bridge for remote web views
//!
//! This library tracks the current browsing context of a remote page over its
//! inspector connection and serves JSON wire protocol commands against it.

pub mod error;
pub mod config;

pub mod inspector;
pub mod context;
pub mod remote;
pub mod session;
pub mod commands;
pub mod server;

// Re-exports
pub use error::{Error, Result};

/// Webview-Driver library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
