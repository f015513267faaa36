//! Frame lifecycle notifications
//!
//! Raw inspector events are classified here; anything the context engine does
//! not react to becomes [`DomEvent::Other`] or no [`PageEvent`] at all.

use serde::Deserialize;

use crate::inspector::types::Node;
use crate::inspector::{InspectorEvent, NodeId};

/// An iframe showing up under `parent`, with its already-loaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInsertion {
    pub node: NodeId,
    pub parent: NodeId,
    pub content_document: NodeId,
}

/// DOM mutation relevant to the current frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    ChildNodeRemoved { node: NodeId, parent: NodeId },
    ChildIframeInserted(FrameInsertion),
    /// Any other notification; always ignored
    Other,
}

/// Page lifecycle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The top-level document started loading
    TopFrameNavigated,
    /// The page finished loading
    LoadEventFired,
    /// Some frame was detached from the page
    FrameDetached,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChildNodeRemovedParams {
    parent_node_id: NodeId,
    node_id: NodeId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChildNodeInsertedParams {
    parent_node_id: NodeId,
    node: Node,
}

impl DomEvent {
    /// Classify an inspector event; malformed payloads are `Other`
    pub fn from_inspector(event: &InspectorEvent) -> Self {
        match event.method.as_str() {
            "DOM.childNodeRemoved" => {
                match ChildNodeRemovedParams::deserialize(&event.params) {
                    Ok(p) => DomEvent::ChildNodeRemoved {
                        node: p.node_id,
                        parent: p.parent_node_id,
                    },
                    Err(_) => DomEvent::Other,
                }
            }
            "DOM.childNodeInserted" => {
                let Ok(p) = ChildNodeInsertedParams::deserialize(&event.params) else {
                    return DomEvent::Other;
                };
                match p.node.content_document {
                    Some(document) if p.node.is_frame_owner() && document.node_id.0 != 0 => {
                        DomEvent::ChildIframeInserted(FrameInsertion {
                            node: p.node.node_id,
                            parent: p.parent_node_id,
                            content_document: document.node_id,
                        })
                    }
                    _ => DomEvent::Other,
                }
            }
            _ => DomEvent::Other,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, DomEvent::Other)
    }
}

impl PageEvent {
    pub fn from_inspector(event: &InspectorEvent) -> Option<Self> {
        match event.method.as_str() {
            "Page.loadEventFired" => Some(PageEvent::LoadEventFired),
            "Page.frameDetached" => Some(PageEvent::FrameDetached),
            "Page.frameNavigated" => {
                let frame = event.params.get("frame")?;
                match frame.get("parentId") {
                    None | Some(serde_json::Value::Null) => Some(PageEvent::TopFrameNavigated),
                    Some(_) => None,
                }
            }
            _ => None,
        }
    }
}
