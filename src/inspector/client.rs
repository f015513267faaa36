//! Inspector client implementation
//!
//! Implements the [`Inspector`] capability on top of a raw connection using
//! the DOM and Runtime domains of the remote-debugging protocol.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Inspector client implementation
#[derive(Debug, Clone)]
pub struct DevToolsInspector {
    /// Underlying inspector connection
    connection: Arc<dyn InspectorConnection>,
}

impl DevToolsInspector {
    /// Create a new inspector client
    ///
    /// # Arguments
    /// * `connection` - inspector connection instance
    pub fn new(connection: Arc<dyn InspectorConnection>) -> Self {
        Self { connection }
    }

    /// Enable a protocol domain (e.g. "DOM")
    pub async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        info!("Enabling domain: {}", domain);
        self.call_method(&format!("{}.enable", domain), json!({})).await?;
        Ok(())
    }

    /// Call a raw protocol method
    pub async fn call_method(&self, method: &str, params: Value) -> Result<Value, Error> {
        debug!("Calling inspector method: {}", method);

        let response = self.connection.send_command(method, params).await?;

        response
            .result
            .ok_or_else(|| Error::remote(format!("No result in response to {}", method)))
    }

    /// Map a remote object descriptor to a value or an object reference
    fn parse_remote_object(descriptor: RemoteObjectDescriptor) -> RemoteValue {
        if let Some(object_id) = descriptor.object_id {
            return RemoteValue::Object(ObjectId(object_id));
        }

        match descriptor.r#type.as_str() {
            "undefined" => RemoteValue::null(),
            _ => RemoteValue::Value(descriptor.value.unwrap_or(Value::Null)),
        }
    }

    /// Decode a Runtime call result, turning page exceptions into errors
    fn runtime_result(result: Value) -> Result<RemoteValue, Error> {
        let response: RuntimeCallResponse = serde_json::from_value(result)
            .map_err(|e| Error::remote(format!("Failed to parse runtime response: {}", e)))?;

        if let Some(exception) = response.exception_details {
            return Err(Error::script_execution_failed(exception.message()));
        }

        Ok(Self::parse_remote_object(response.result))
    }

    fn node_id_field(result: &Value, field: &str) -> Result<NodeId, Error> {
        result
            .get(field)
            .and_then(|v| v.as_i64())
            .filter(|id| *id != 0)
            .map(NodeId)
            .ok_or_else(|| Error::remote(format!("Missing {} in inspector response", field)))
    }

    fn is_missing_node(error: &Error) -> bool {
        match error {
            Error::Remote(message) => {
                let message = message.to_lowercase();
                message.contains("could not find node") || message.contains("no node with given id")
            }
            _ => false,
        }
    }
}

#[async_trait]
impl Inspector for DevToolsInspector {
    fn is_active(&self) -> bool {
        self.connection.is_active()
    }

    async fn document_root(&self) -> Result<NodeId, Error> {
        let result = self
            .call_method("DOM.getDocument", json!({ "depth": -1, "pierce": true }))
            .await?;

        let root = result
            .get("root")
            .ok_or_else(|| Error::remote("No root in DOM.getDocument response"))?;
        Self::node_id_field(root, "nodeId")
    }

    async fn main_window(&self) -> Result<ObjectId, Error> {
        let params = EvaluateParams {
            expression: "window".to_string(),
            return_by_value: false,
        };
        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        Self::runtime_result(result)?.into_object("window")
    }

    async fn resolve_node(&self, node: NodeId) -> Result<ObjectId, Error> {
        let result = self
            .call_method("DOM.resolveNode", json!({ "nodeId": node }))
            .await?;

        result
            .get("object")
            .and_then(|o| o.get("objectId"))
            .and_then(|id| id.as_str())
            .map(ObjectId::new)
            .ok_or_else(|| Error::remote(format!("Node {} did not resolve to an object", node)))
    }

    async fn request_node(&self, object: &ObjectId) -> Result<NodeId, Error> {
        let result = self
            .call_method("DOM.requestNode", json!({ "objectId": object }))
            .await?;

        Self::node_id_field(&result, "nodeId")
    }

    async fn call_function_on(&self, object: &ObjectId, declaration: &str) -> Result<RemoteValue, Error> {
        let params = CallFunctionOnParams {
            object_id: object.0.clone(),
            function_declaration: declaration.to_string(),
            return_by_value: false,
            await_promise: false,
        };

        let result = self
            .call_method("Runtime.callFunctionOn", serde_json::to_value(params)?)
            .await?;

        Self::runtime_result(result)
    }

    async fn content_document(&self, node: NodeId) -> Result<NodeId, Error> {
        let result = self
            .call_method("DOM.describeNode", json!({ "nodeId": node, "depth": 1 }))
            .await?;

        let described: Node = serde_json::from_value(
            result
                .get("node")
                .cloned()
                .ok_or_else(|| Error::remote("No node in DOM.describeNode response"))?,
        )
        .map_err(|e| Error::remote(format!("Failed to parse node: {}", e)))?;

        let document = described
            .content_document
            .ok_or_else(|| Error::no_such_frame(format!("Node {} has no content document", node)))?;

        if document.node_id.0 != 0 {
            return Ok(document.node_id);
        }

        // Not yet known to the frontend; push it by backend id.
        let pushed = self
            .call_method(
                "DOM.pushNodesByBackendIdsToFrontend",
                json!({ "backendNodeIds": [document.backend_node_id] }),
            )
            .await?;

        pushed
            .get("nodeIds")
            .and_then(|ids| ids.get(0))
            .and_then(|id| id.as_i64())
            .filter(|id| *id != 0)
            .map(NodeId)
            .ok_or_else(|| Error::remote(format!("Content document of node {} is not reachable", node)))
    }

    async fn exists(&self, node: NodeId) -> Result<bool, Error> {
        match self
            .call_method("DOM.describeNode", json!({ "nodeId": node }))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if Self::is_missing_node(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn subscribe_events(&self) -> Result<tokio::sync::mpsc::Receiver<InspectorEvent>, Error> {
        self.connection.listen_events().await
    }

    async fn close(&self) -> Result<(), Error> {
        self.connection.close().await
    }
}
