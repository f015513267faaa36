//! Unified error types for Webview-Driver

use std::net;
use thiserror::Error;

use crate::inspector::NodeId;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Webview-Driver
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network errors
    #[error("Network error: {0}")]
    Net(#[from] net::AddrParseError),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Inspector (remote-debugging) failures
    #[error("Remote error: {0}")]
    Remote(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Element not found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Frame not found
    #[error("No such frame: {0}")]
    NoSuchFrame(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// More than one buffered frame could replace the removed current frame
    #[error("Ambiguous frame replacement under parent {parent}: {candidates} candidates")]
    AmbiguousFrame { parent: NodeId, candidates: usize },

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Malformed request parameters
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Command name not recognized
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Operation not supported
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new remote (inspector) error
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        Error::Remote(msg.into())
    }

    /// Create a new session not found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Error::SessionNotFound(id.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(id: S) -> Self {
        Error::ElementNotFound(id.into())
    }

    /// Create a new no such frame error
    pub fn no_such_frame<S: Into<String>>(msg: S) -> Self {
        Error::NoSuchFrame(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new ambiguous frame error
    pub fn ambiguous_frame(parent: NodeId, candidates: usize) -> Self {
        Error::AmbiguousFrame { parent, candidates }
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a new unknown command error
    pub fn unknown_command<S: Into<String>>(name: S) -> Self {
        Error::UnknownCommand(name.into())
    }

    /// Create a new unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error is a wait that ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}
