//! Inspector type definitions
//!
//! Identifiers, JSON-RPC frames and the DOM/Runtime payloads used by the
//! remote-debugging transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page-scoped identifier of a DOM node
///
/// Only meaningful for the document that produced it; a node id kept across a
/// navigation may name a different node or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    /// Parse a node id from a WebDriver element reference
    pub fn parse(reference: &str) -> Option<Self> {
        reference.trim().parse::<i64>().ok().map(NodeId)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id)
    }
}

/// Identifier of a remote JavaScript object (window, NodeList, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        ObjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inspector JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct InspectorRequest {
    /// Request ID
    pub id: u64,
    /// Method name (e.g., "DOM.getDocument")
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Inspector JSON-RPC notification (event)
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorNotification {
    /// Event method (e.g., "DOM.childNodeRemoved")
    pub method: String,
    /// Event parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Inspector JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorRpcResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    #[serde(default)]
    pub result: serde_json::Value,
    /// Error if any
    #[serde(default)]
    pub error: Option<InspectorErrorDetail>,
}

/// Inspector error detail
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// `Runtime.callFunctionOn` parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    /// Object the function is bound to as `this`
    pub object_id: String,
    /// Function source
    pub function_declaration: String,
    /// Return primitives by value, objects by reference
    pub return_by_value: bool,
    /// Whether to await a returned promise
    pub await_promise: bool,
}

/// `Runtime.evaluate` parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    /// JavaScript expression to evaluate
    pub expression: String,
    /// Whether to return as value
    pub return_by_value: bool,
}

/// Remote object descriptor returned by Runtime methods
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObjectDescriptor {
    /// Object type
    #[serde(default)]
    pub r#type: String,
    /// Object subtype
    #[serde(default)]
    pub subtype: Option<String>,
    /// Object value (primitives)
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// Handle for non-primitive values
    #[serde(default)]
    pub object_id: Option<String>,
    /// Object description
    #[serde(default)]
    pub description: Option<String>,
}

/// Exception details
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Exception text
    #[serde(default)]
    pub text: Option<String>,
    /// Exception object
    #[serde(default)]
    pub exception: Option<RemoteObjectDescriptor>,
}

impl ExceptionDetails {
    /// Human readable summary
    pub fn message(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .or_else(|| self.text.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Runtime call response (`Runtime.evaluate`, `Runtime.callFunctionOn`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeCallResponse {
    /// Evaluation result
    #[serde(default)]
    pub result: RemoteObjectDescriptor,
    /// Exception details if evaluation failed
    #[serde(default)]
    pub exception_details: Option<ExceptionDetails>,
}

/// DOM node
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node ID
    pub node_id: NodeId,
    /// Backend ID
    #[serde(default)]
    pub backend_node_id: i64,
    /// Node type
    #[serde(default)]
    pub node_type: i32,
    /// Node name
    #[serde(default)]
    pub node_name: String,
    /// Content document of frame owner elements
    #[serde(default)]
    pub content_document: Option<Box<Node>>,
}

impl Node {
    /// Whether this node owns a nested browsing context
    pub fn is_frame_owner(&self) -> bool {
        self.node_name.eq_ignore_ascii_case("IFRAME") || self.node_name.eq_ignore_ascii_case("FRAME")
    }
}

/// Page/target description from the discovery endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    /// Target ID
    pub id: String,
    /// Target type
    #[serde(default, rename = "type")]
    pub target_type: String,
    /// Target title
    #[serde(default)]
    pub title: String,
    /// Target URL
    #[serde(default)]
    pub url: String,
    /// WebSocket debugger URL, absent when another client is attached
    #[serde(default)]
    pub web_socket_debugger_url: Option<String>,
}
