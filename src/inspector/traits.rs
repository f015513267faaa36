//! Inspector layer traits
//!
//! This module defines the abstract interfaces of the remote-debugging
//! transport: the raw connection, the typed capability used by the context
//! engine and the host used to discover and attach to pages.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::types::{NodeId, ObjectId};

/// Inspector event representation
#[derive(Debug, Clone)]
pub struct InspectorEvent {
    /// Event method (e.g., "DOM.childNodeRemoved")
    pub method: String,
    /// Event parameters
    pub params: Value,
}

impl InspectorEvent {
    pub fn new<S: Into<String>>(method: S, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Inspector response representation
#[derive(Debug, Clone)]
pub struct InspectorResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<InspectorError>,
}

/// Inspector error representation
#[derive(Debug, Clone)]
pub struct InspectorError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

/// Result of a remote call
///
/// Primitives come back by value; anything else stays in the page and is
/// addressed through its object id.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
    /// JSON-representable primitive (including `null`)
    Value(Value),
    /// Reference to a remote object
    Object(ObjectId),
}

impl RemoteValue {
    pub fn null() -> Self {
        RemoteValue::Value(Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectId> {
        match self {
            RemoteValue::Object(id) => Some(id),
            RemoteValue::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RemoteValue::Value(value) => Some(value),
            RemoteValue::Object(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RemoteValue::Value(Value::Null))
    }

    /// Take the object reference or fail with a remote error naming `what`
    pub fn into_object(self, what: &str) -> Result<ObjectId, crate::Error> {
        match self {
            RemoteValue::Object(id) => Ok(id),
            RemoteValue::Value(value) => Err(crate::Error::remote(format!(
                "expected {} to be an object, got {}",
                what, value
            ))),
        }
    }
}

impl From<Value> for RemoteValue {
    fn from(value: Value) -> Self {
        RemoteValue::Value(value)
    }
}

/// Inspector connection trait
///
/// Represents a WebSocket connection to one debuggable page.
#[async_trait]
pub trait InspectorConnection: Send + Sync + std::fmt::Debug {
    /// Send a command and wait for its response
    async fn send_command(&self, method: &str, params: Value) -> Result<InspectorResponse, crate::Error>;

    /// Subscribe to inspector events
    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<InspectorEvent>, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// Inspector capability
///
/// The remote operations the context engine, the remote handles and the
/// command translators rely on. Implementations must be usable from many tasks
/// at once.
#[async_trait]
pub trait Inspector: Send + Sync + std::fmt::Debug {
    /// Whether the underlying transport is still usable
    fn is_active(&self) -> bool;

    /// Node id of the top-level document
    async fn document_root(&self) -> Result<NodeId, crate::Error>;

    /// Object id of the top-level window
    async fn main_window(&self) -> Result<ObjectId, crate::Error>;

    /// Remote object bound to a DOM node
    async fn resolve_node(&self, node: NodeId) -> Result<ObjectId, crate::Error>;

    /// DOM node behind a remote object
    async fn request_node(&self, object: &ObjectId) -> Result<NodeId, crate::Error>;

    /// Call `declaration` with `this` bound to `object`
    async fn call_function_on(&self, object: &ObjectId, declaration: &str) -> Result<RemoteValue, crate::Error>;

    /// Content document of a frame owner element
    async fn content_document(&self, node: NodeId) -> Result<NodeId, crate::Error>;

    /// Liveness check against the live page
    async fn exists(&self, node: NodeId) -> Result<bool, crate::Error>;

    /// Subscribe to all events of the page
    async fn subscribe_events(&self) -> Result<tokio::sync::mpsc::Receiver<InspectorEvent>, crate::Error>;

    /// Release the transport
    async fn close(&self) -> Result<(), crate::Error>;
}

/// Inspector host trait
///
/// The debuggable application: lists its pages and opens inspectors on them.
#[async_trait]
pub trait InspectorHost: Send + Sync + std::fmt::Debug {
    /// Open an inspector on `target_id`, or on the first page when `None`
    async fn connect(&self, target_id: Option<&str>) -> Result<Arc<dyn Inspector>, crate::Error>;

    /// List all targets (pages, workers, etc.)
    async fn list_targets(&self) -> Result<Vec<TargetInfo>, crate::Error>;

    /// Get host version
    async fn version(&self) -> Result<HostVersion, crate::Error>;

    /// Close every inspector opened through this host
    async fn close(&self) -> Result<(), crate::Error>;
}

/// Host version information
#[derive(Debug, Clone)]
pub struct HostVersion {
    /// Protocol version
    pub protocol_version: String,
    /// Product name
    pub product: String,
    /// User agent
    pub user_agent: String,
}

/// Target information (page, worker, etc.)
#[derive(Debug, Clone)]
pub struct TargetInfo {
    /// Target ID
    pub target_id: String,
    /// Target type
    pub target_type: String,
    /// Target title
    pub title: String,
    /// Target URL
    pub url: String,
}

impl TargetInfo {
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}
