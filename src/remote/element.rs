//! Remote DOM node handle

use std::sync::Arc;

use super::object::RemoteObject;
use crate::inspector::{Inspector, NodeId, RemoteValue};
use crate::Error;

pub(crate) const SUBMIT: &str = "function(){ \
    var form = this.tagName && this.tagName.toLowerCase() === 'form' ? this : this.form; \
    if (!form) { return false; } \
    if (form.requestSubmit) { form.requestSubmit(); } else { form.submit(); } \
    return true; }";

/// Handle on a DOM node of the remote page
///
/// Holds the node id only; it becomes meaningless once the owning document
/// goes away, which [`exists`](Self::exists) can detect.
#[derive(Debug, Clone)]
pub struct RemoteElement {
    node: NodeId,
    inspector: Arc<dyn Inspector>,
}

impl RemoteElement {
    pub fn new(node: NodeId, inspector: Arc<dyn Inspector>) -> Self {
        Self { node, inspector }
    }

    /// Element behind a remote object (e.g. an item of a NodeList)
    pub async fn from_object(object: &RemoteObject) -> Result<Self, Error> {
        let node = object.inspector().request_node(object.id()).await?;
        Ok(Self::new(node, Arc::clone(object.inspector())))
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn inspector(&self) -> &Arc<dyn Inspector> {
        &self.inspector
    }

    /// Whether the node is still attached to the live page
    pub async fn exists(&self) -> Result<bool, Error> {
        self.inspector.exists(self.node).await
    }

    /// Remote object bound to this node
    pub async fn resolve(&self) -> Result<RemoteObject, Error> {
        let id = self.inspector.resolve_node(self.node).await?;
        Ok(RemoteObject::new(id, Arc::clone(&self.inspector)))
    }

    /// Current content document of a frame owner
    pub async fn content_document(&self) -> Result<RemoteElement, Error> {
        let document = self.inspector.content_document(self.node).await?;
        Ok(RemoteElement::new(document, Arc::clone(&self.inspector)))
    }

    /// Current content window of a frame owner
    pub async fn content_window(&self) -> Result<RemoteObject, Error> {
        self.resolve().await?.call_object(".contentWindow").await
    }

    /// Evaluate `expression` against this node
    pub async fn call(&self, expression: &str) -> Result<RemoteValue, Error> {
        self.resolve().await?.call(expression).await
    }

    /// Submit the form this element is, or belongs to
    pub async fn submit(&self) -> Result<(), Error> {
        let submitted = self.resolve().await?.call_function(SUBMIT).await?;
        match submitted.as_value().and_then(|v| v.as_bool()) {
            Some(true) => Ok(()),
            _ => Err(Error::invalid_argument(format!(
                "Element {} is not part of a form",
                self.node
            ))),
        }
    }
}

impl PartialEq for RemoteElement {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for RemoteElement {}
