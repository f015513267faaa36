//! Mock inspector implementation for testing
//!
//! A scriptable in-memory page: DOM nodes with liveness and content documents,
//! canned results for remote calls, failure injection and event emission.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::inspector::traits::*;
use crate::inspector::types::{NodeId, ObjectId};
use crate::remote::accessor;
use crate::Error;

#[derive(Debug, Clone, Copy)]
struct MockNode {
    alive: bool,
    content_document: Option<NodeId>,
}

#[derive(Debug)]
struct MockPage {
    root: NodeId,
    nodes: HashMap<NodeId, MockNode>,
    calls: HashMap<(ObjectId, String), Result<RemoteValue, String>>,
    object_nodes: HashMap<ObjectId, NodeId>,
}

/// Mock inspector
#[derive(Debug)]
pub struct MockInspector {
    page: Mutex<MockPage>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<InspectorEvent>>>,
    is_active: AtomicBool,
    remote_calls: AtomicUsize,
}

impl MockInspector {
    /// Root document node of a fresh mock page
    pub const ROOT: NodeId = NodeId(1);

    /// Create a mock page containing only its root document
    pub fn new() -> Self {
        let mut page = MockPage {
            root: Self::ROOT,
            nodes: HashMap::new(),
            calls: HashMap::new(),
            object_nodes: HashMap::new(),
        };
        page.nodes.insert(
            Self::ROOT,
            MockNode {
                alive: true,
                content_document: None,
            },
        );

        Self {
            page: Mutex::new(page),
            subscribers: Mutex::new(Vec::new()),
            is_active: AtomicBool::new(true),
            remote_calls: AtomicUsize::new(0),
        }
    }

    /// Object id the mock hands out for a node
    pub fn node_object(node: NodeId) -> ObjectId {
        ObjectId(format!("node-{}", node))
    }

    /// Object id of the top-level window
    pub fn window_object() -> ObjectId {
        ObjectId::new("window")
    }

    /// Object id of the content window of an iframe
    pub fn frame_window_object(iframe: NodeId) -> ObjectId {
        ObjectId(format!("window-{}", iframe))
    }

    fn page(&self) -> std::sync::MutexGuard<'_, MockPage> {
        self.page.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a live element
    pub fn add_node(&self, node: NodeId) {
        self.page().nodes.insert(
            node,
            MockNode {
                alive: true,
                content_document: None,
            },
        );
    }

    /// Register a live iframe with its content document and content window
    pub fn add_iframe(&self, iframe: NodeId, content_document: NodeId) -> ObjectId {
        let window = Self::frame_window_object(iframe);
        let mut page = self.page();
        page.nodes.insert(
            iframe,
            MockNode {
                alive: true,
                content_document: Some(content_document),
            },
        );
        page.nodes.insert(
            content_document,
            MockNode {
                alive: true,
                content_document: None,
            },
        );
        page.calls.insert(
            (Self::node_object(iframe), accessor(".contentWindow")),
            Ok(RemoteValue::Object(window.clone())),
        );
        window
    }

    /// Point an existing iframe at a new content document (frame reload)
    pub fn set_content_document(&self, iframe: NodeId, content_document: NodeId) {
        let mut page = self.page();
        if let Some(node) = page.nodes.get_mut(&iframe) {
            node.content_document = Some(content_document);
        }
        page.nodes.entry(content_document).or_insert(MockNode {
            alive: true,
            content_document: None,
        });
    }

    /// Detach a node from the page
    pub fn remove_node(&self, node: NodeId) {
        if let Some(node) = self.page().nodes.get_mut(&node) {
            node.alive = false;
        }
    }

    /// Replace the top-level document
    pub fn set_root(&self, root: NodeId) {
        let mut page = self.page();
        page.root = root;
        page.nodes.insert(
            root,
            MockNode {
                alive: true,
                content_document: None,
            },
        );
    }

    /// Script the result of calling `declaration` on `object`
    pub fn on_call(&self, object: &ObjectId, declaration: &str, value: RemoteValue) {
        self.page()
            .calls
            .insert((object.clone(), declaration.to_string()), Ok(value));
    }

    /// Script the result of reading `expression` (e.g. ".title", "[0]") on `object`
    pub fn on_property(&self, object: &ObjectId, expression: &str, value: RemoteValue) {
        self.on_call(object, &accessor(expression), value);
    }

    /// Make calling `declaration` on `object` fail
    pub fn fail_call(&self, object: &ObjectId, declaration: &str, message: &str) {
        self.page()
            .calls
            .insert((object.clone(), declaration.to_string()), Err(message.to_string()));
    }

    /// Make reading `expression` on `object` fail
    pub fn fail_property(&self, object: &ObjectId, expression: &str, message: &str) {
        self.fail_call(object, &accessor(expression), message);
    }

    /// Declare which node a remote object stands for
    pub fn link_object(&self, object: &ObjectId, node: NodeId) {
        self.add_node(node);
        self.page().object_nodes.insert(object.clone(), node);
    }

    /// Deliver an event to every subscriber
    pub fn emit(&self, event: InspectorEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Number of remote calls served so far
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    fn check_active(&self) -> Result<(), Error> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_active.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::remote("Inspector is closed"))
        }
    }

    fn live_node(&self, node: NodeId) -> Result<MockNode, Error> {
        match self.page().nodes.get(&node) {
            Some(n) if n.alive => Ok(*n),
            _ => Err(Error::remote("Could not find node with given id")),
        }
    }
}

impl Default for MockInspector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Inspector for MockInspector {
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    async fn document_root(&self) -> Result<NodeId, Error> {
        self.check_active()?;
        Ok(self.page().root)
    }

    async fn main_window(&self) -> Result<ObjectId, Error> {
        self.check_active()?;
        Ok(Self::window_object())
    }

    async fn resolve_node(&self, node: NodeId) -> Result<ObjectId, Error> {
        self.check_active()?;
        self.live_node(node)?;
        Ok(Self::node_object(node))
    }

    async fn request_node(&self, object: &ObjectId) -> Result<NodeId, Error> {
        self.check_active()?;
        if let Some(node) = self.page().object_nodes.get(object) {
            return Ok(*node);
        }
        object
            .as_str()
            .strip_prefix("node-")
            .and_then(NodeId::parse)
            .ok_or_else(|| Error::remote(format!("Object {} is not a node", object)))
    }

    async fn call_function_on(&self, object: &ObjectId, declaration: &str) -> Result<RemoteValue, Error> {
        self.check_active()?;
        let scripted = self
            .page()
            .calls
            .get(&(object.clone(), declaration.to_string()))
            .cloned();

        match scripted {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Error::remote(message)),
            None => Err(Error::remote(format!(
                "No scripted result for {} on {}",
                declaration, object
            ))),
        }
    }

    async fn content_document(&self, node: NodeId) -> Result<NodeId, Error> {
        self.check_active()?;
        self.live_node(node)?
            .content_document
            .ok_or_else(|| Error::no_such_frame(format!("Node {} has no content document", node)))
    }

    async fn exists(&self, node: NodeId) -> Result<bool, Error> {
        self.check_active()?;
        Ok(self.live_node(node).is_ok())
    }

    async fn subscribe_events(&self) -> Result<mpsc::Receiver<InspectorEvent>, Error> {
        self.check_active()?;

        let (sender, receiver) = mpsc::channel(100);
        let (unbounded_sender, mut unbounded_receiver) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(unbounded_sender);

        tokio::spawn(async move {
            while let Some(event) = unbounded_receiver.recv().await {
                if sender.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(receiver)
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::SeqCst);
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        Ok(())
    }
}

/// Mock inspector host serving one shared [`MockInspector`]
#[derive(Debug)]
pub struct MockInspectorHost {
    inspector: Arc<MockInspector>,
    targets: Mutex<Vec<TargetInfo>>,
    is_active: AtomicBool,
}

impl MockInspectorHost {
    /// Create a host with a single page target
    pub fn new() -> Self {
        Self::with_inspector(Arc::new(MockInspector::new()))
    }

    /// Create a host around an existing mock inspector
    pub fn with_inspector(inspector: Arc<MockInspector>) -> Self {
        Self {
            inspector,
            targets: Mutex::new(vec![TargetInfo {
                target_id: "page-1".to_string(),
                target_type: "page".to_string(),
                title: "Mock Page".to_string(),
                url: "about:blank".to_string(),
            }]),
            is_active: AtomicBool::new(true),
        }
    }

    /// The inspector every `connect` call returns
    pub fn inspector(&self) -> Arc<MockInspector> {
        Arc::clone(&self.inspector)
    }

    /// Add a target to the listing
    pub fn add_target(&self, target_id: &str, target_type: &str) {
        self.targets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(TargetInfo {
                target_id: target_id.to_string(),
                target_type: target_type.to_string(),
                title: String::new(),
                url: "about:blank".to_string(),
            });
    }
}

impl Default for MockInspectorHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InspectorHost for MockInspectorHost {
    async fn connect(&self, _target_id: Option<&str>) -> Result<Arc<dyn Inspector>, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::remote("Host is closed"));
        }
        Ok(self.inspector.clone())
    }

    async fn list_targets(&self) -> Result<Vec<TargetInfo>, Error> {
        Ok(self
            .targets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    async fn version(&self) -> Result<HostVersion, Error> {
        Ok(HostVersion {
            protocol_version: "1.3".to_string(),
            product: "MockWebView/1.0".to_string(),
            user_agent: "Mock WebView".to_string(),
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::SeqCst);
        self.inspector.close().await
    }
}
