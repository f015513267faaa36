//! Tests for the context synchronization engine
//!
//! Frame replacement in both event orders, bounded waits, main frame
//! bookkeeping, reload handling, readers racing slow transitions and the
//! event pump.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

use crate::context::{ContextTimeouts, DomContext, DomEvent, EventPump, FrameInsertion, Readiness};
use crate::inspector::{Inspector, InspectorEvent, MockInspector, NodeId, ObjectId, RemoteValue};
use crate::remote::{RemoteElement, RemoteObject};
use crate::Error;

const PARENT: NodeId = NodeId(2);

fn fast_timeouts() -> ContextTimeouts {
    ContextTimeouts {
        document_poll_interval: Duration::from_millis(10),
        document_poll_retries: 5,
        load_event_timeout: Duration::from_millis(200),
    }
}

fn setup() -> (Arc<MockInspector>, Arc<DomContext>) {
    let inspector = Arc::new(MockInspector::new());
    let context = Arc::new(DomContext::new(inspector.clone(), fast_timeouts()));
    (inspector, context)
}

async fn establish_main(inspector: &Arc<MockInspector>, context: &DomContext) {
    let document = RemoteElement::new(MockInspector::ROOT, inspector.clone());
    let window = RemoteObject::new(MockInspector::window_object(), inspector.clone());
    context.set_current_frame(None, Some(document), Some(window)).await;
}

async fn enter_iframe(inspector: &Arc<MockInspector>, context: &DomContext, iframe: i64, document: i64) {
    let window = inspector.add_iframe(NodeId(iframe), NodeId(document));
    context
        .set_current_frame(
            Some(RemoteElement::new(NodeId(iframe), inspector.clone())),
            Some(RemoteElement::new(NodeId(document), inspector.clone())),
            Some(RemoteObject::new(window, inspector.clone())),
        )
        .await;
}

fn removed(node: i64) -> DomEvent {
    DomEvent::ChildNodeRemoved {
        node: NodeId(node),
        parent: PARENT,
    }
}

fn inserted(node: i64, parent: NodeId, document: i64) -> DomEvent {
    DomEvent::ChildIframeInserted(FrameInsertion {
        node: NodeId(node),
        parent,
        content_document: NodeId(document),
    })
}

async fn current_document(context: &DomContext) -> Option<NodeId> {
    context
        .get_document()
        .await
        .expect("document should be ready")
        .map(|d| d.node_id())
}

#[tokio::test]
async fn test_removal_then_insertion_converges() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.add_iframe(NodeId(20), NodeId(21));

    context.dom_has_changed(removed(10)).await.unwrap();
    assert_eq!(context.readiness().await, Readiness::AwaitingReplacement { parent: PARENT });

    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.readiness, Readiness::Ready);
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.window, Some(MockInspector::frame_window_object(NodeId(20))));
    assert_eq!(snapshot.pending_insertions, 0);
    assert_eq!(current_document(&context).await, Some(NodeId(21)));
    assert!(!context.is_on_main_frame().await);
}

#[tokio::test]
async fn test_insertion_then_removal_converges() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.add_iframe(NodeId(20), NodeId(21));

    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();
    let buffered = context.snapshot().await;
    assert_eq!(buffered.readiness, Readiness::Ready);
    assert_eq!(buffered.iframe, Some(NodeId(10)));
    assert_eq!(buffered.pending_insertions, 1);

    context.dom_has_changed(removed(10)).await.unwrap();

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.readiness, Readiness::Ready);
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.pending_insertions, 0);
    assert_eq!(current_document(&context).await, Some(NodeId(21)));
}

#[tokio::test]
async fn test_unrelated_removal_is_ignored() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;

    context.dom_has_changed(removed(99)).await.unwrap();
    context.dom_has_changed(DomEvent::Other).await.unwrap();

    assert_eq!(context.readiness().await, Readiness::Ready);
    assert_eq!(context.snapshot().await.iframe, Some(NodeId(10)));
}

#[tokio::test]
async fn test_removal_on_main_frame_is_ignored() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;

    context.dom_has_changed(removed(10)).await.unwrap();
    assert_eq!(context.readiness().await, Readiness::Ready);
}

#[tokio::test]
async fn test_insertion_under_other_parent_is_buffered_while_waiting() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    context.dom_has_changed(removed(10)).await.unwrap();

    context.dom_has_changed(inserted(30, NodeId(3), 31)).await.unwrap();

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.readiness, Readiness::AwaitingReplacement { parent: PARENT });
    assert_eq!(snapshot.pending_insertions, 1);
    assert_eq!(snapshot.iframe, Some(NodeId(10)));
}

#[tokio::test]
async fn test_get_document_times_out_and_self_heals() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    context.dom_has_changed(removed(10)).await.unwrap();

    let result = context.get_document().await;
    assert!(matches!(result, Err(Error::Timeout(_))));
    assert_eq!(context.readiness().await, Readiness::Ready);

    let next = timeout(Duration::from_millis(5), context.get_document())
        .await
        .expect("second call must not block");
    assert!(next.is_ok());
}

#[tokio::test]
async fn test_waiting_reader_sees_replacement() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.add_iframe(NodeId(20), NodeId(21));
    context.dom_has_changed(removed(10)).await.unwrap();

    let reader = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.get_document().await })
    };

    tokio::time::sleep(Duration::from_millis(15)).await;
    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();

    let document = reader.await.unwrap().unwrap();
    assert_eq!(document.map(|d| d.node_id()), Some(NodeId(21)));
}

#[tokio::test]
async fn test_ambiguous_replacement_is_observable() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;

    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();
    context.dom_has_changed(inserted(30, PARENT, 31)).await.unwrap();
    context.dom_has_changed(removed(10)).await.unwrap();

    assert_eq!(context.readiness().await, Readiness::AwaitingReplacement { parent: PARENT });
    let ambiguous = context.ambiguous_replacement().await.unwrap();
    assert_eq!(ambiguous.parent, PARENT);
    assert_eq!(ambiguous.candidates, 2);
    assert_eq!(context.snapshot().await.pending_insertions, 2);

    match context.get_document().await {
        Err(Error::AmbiguousFrame { parent, candidates }) => {
            assert_eq!(parent, PARENT);
            assert_eq!(candidates, 2);
        }
        other => panic!("expected ambiguous frame, got {:?}", other),
    }
    assert_eq!(context.readiness().await, Readiness::Ready);
    assert!(context.ambiguous_replacement().await.is_none());
}

#[tokio::test]
async fn test_failed_frame_resolution_is_reported() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    context.dom_has_changed(removed(10)).await.unwrap();

    // Node 40 was never registered, so its content window cannot be resolved.
    let result = context.dom_has_changed(inserted(40, PARENT, 41)).await;
    assert!(matches!(result, Err(Error::Remote(_))));
    assert_eq!(context.readiness().await, Readiness::AwaitingReplacement { parent: PARENT });
}

#[tokio::test]
async fn test_switch_to_default_restores_main() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    assert!(!context.is_on_main_frame().await);

    context.set_current_frame(None, None, None).await;

    assert!(context.is_on_main_frame().await);
    assert_eq!(current_document(&context).await, Some(MockInspector::ROOT));
    assert_eq!(
        context.get_window().await.map(|w| w.id().clone()),
        Some(MockInspector::window_object())
    );
}

#[tokio::test]
async fn test_switch_to_default_without_main_is_noop() {
    let (_inspector, context) = setup();

    context.set_current_frame(None, None, None).await;

    assert!(context.is_on_main_frame().await);
    assert_eq!(current_document(&context).await, None);
    assert!(context.get_window().await.is_none());
}

#[tokio::test]
async fn test_first_top_level_document_becomes_baseline() {
    let (inspector, context) = setup();
    let document = RemoteElement::new(NodeId(5), inspector.clone());
    let window = RemoteObject::new(ObjectId::new("win-5"), inspector.clone());

    context.set_current_frame(None, Some(document), Some(window)).await;
    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.main_document, Some(NodeId(5)));
    assert_eq!(snapshot.main_window, Some(ObjectId::new("win-5")));

    enter_iframe(&inspector, &context, 10, 11).await;
    context.set_current_frame(None, None, None).await;

    assert_eq!(current_document(&context).await, Some(NodeId(5)));
    assert_eq!(
        context.get_window().await.map(|w| w.id().clone()),
        Some(ObjectId::new("win-5"))
    );
}

#[tokio::test]
async fn test_set_current_frame_clears_pending_wait() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    context.dom_has_changed(removed(10)).await.unwrap();

    context.set_current_frame(None, None, None).await;
    assert_eq!(context.readiness().await, Readiness::Ready);
}

#[tokio::test]
async fn test_frame_died_releases_wait() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    context.dom_has_changed(removed(10)).await.unwrap();

    // Still attached: nothing to recover.
    context.frame_died().await;
    assert_eq!(context.readiness().await, Readiness::AwaitingReplacement { parent: PARENT });

    inspector.remove_node(NodeId(10));
    context.frame_died().await;
    assert_eq!(context.readiness().await, Readiness::Ready);
}

#[tokio::test]
async fn test_frame_died_on_main_frame() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;

    context.frame_died().await;
    assert_eq!(context.readiness().await, Readiness::Ready);
    assert!(context.is_on_main_frame().await);
}

#[tokio::test]
async fn test_new_context_keeps_main_window() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;

    context.new_context().await;

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.document, None);
    assert_eq!(snapshot.window, None);
    assert_eq!(snapshot.iframe, None);
    assert_eq!(snapshot.main_document, None);
    assert_eq!(snapshot.main_window, Some(MockInspector::window_object()));

    // Switching back only brings the window back.
    context.set_current_frame(None, None, None).await;
    assert_eq!(current_document(&context).await, None);
    assert_eq!(
        context.get_window().await.map(|w| w.id().clone()),
        Some(MockInspector::window_object())
    );
}

#[tokio::test]
async fn test_new_context_before_main_is_established() {
    let (inspector, context) = setup();

    context.new_context().await;
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    context.set_current_frame(None, None, None).await;

    assert_eq!(current_document(&context).await, Some(MockInspector::ROOT));
    assert_eq!(
        context.get_window().await.map(|w| w.id().clone()),
        Some(MockInspector::window_object())
    );
}

#[tokio::test]
async fn test_reload_reuses_live_iframe() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.set_content_document(NodeId(10), NodeId(12));

    context.signal_new_page_load_received().await;

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, Some(NodeId(10)));
    assert_eq!(snapshot.document, Some(NodeId(12)));
    assert_eq!(snapshot.main_document, Some(MockInspector::ROOT));
    assert!(!snapshot.is_on_main_frame());
}

#[tokio::test]
async fn test_reload_with_dead_iframe_starts_new_context() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.remove_node(NodeId(10));

    context.signal_new_page_load_received().await;

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, None);
    assert_eq!(snapshot.document, None);
    assert_eq!(snapshot.main_document, None);
    assert!(snapshot.is_on_main_frame());
}

#[tokio::test]
async fn test_wait_for_load_event_signalled() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;

    let waiter = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.wait_for_load_event().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    context.signal_new_page_load_received().await;

    assert!(waiter.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_wait_for_load_event_timeout_leaves_context() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    let before = context.snapshot().await;

    let result = context.wait_for_load_event().await;

    assert!(matches!(result, Err(Error::Timeout(_))));
    assert_eq!(context.snapshot().await, before);
}

#[tokio::test]
async fn test_load_wait_is_independent_of_frame_wait() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.set_content_document(NodeId(10), NodeId(12));
    context.dom_has_changed(removed(10)).await.unwrap();

    let waiter = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.wait_for_load_event().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    context.signal_new_page_load_received().await;

    assert!(waiter.await.unwrap().is_ok());
    assert_eq!(context.readiness().await, Readiness::Ready);
}

#[tokio::test]
async fn test_snapshot_display() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;

    let text = context.snapshot().await.to_string();
    assert!(text.contains("document 1"));
    assert!(text.contains("iframe none"));
    assert!(text.contains("mainWindow window"));
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    timeout(Duration::from_secs(2), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached");
}

#[tokio::test]
async fn test_event_pump_applies_events_in_order() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.add_iframe(NodeId(20), NodeId(21));

    let pump = EventPump::start(Arc::clone(&context)).await.unwrap();
    assert!(pump.is_running());

    inspector.emit(InspectorEvent::new(
        "DOM.childNodeRemoved",
        json!({ "parentNodeId": 2, "nodeId": 10 }),
    ));
    inspector.emit(InspectorEvent::new(
        "DOM.childNodeInserted",
        json!({
            "parentNodeId": 2,
            "previousNodeId": 0,
            "node": {
                "nodeId": 20, "nodeName": "IFRAME",
                "contentDocument": { "nodeId": 21, "nodeName": "#document" }
            }
        }),
    ));

    wait_until(|| {
        let context = Arc::clone(&context);
        async move { context.snapshot().await.iframe == Some(NodeId(20)) }
    })
    .await;
    assert_eq!(current_document(&context).await, Some(NodeId(21)));

    pump.stop();
}

#[tokio::test]
async fn test_event_pump_tracks_page_loads() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    let _pump = EventPump::start(Arc::clone(&context)).await.unwrap();

    inspector.emit(InspectorEvent::new(
        "Page.frameNavigated",
        json!({ "frame": { "id": "main", "url": "https://example.com" } }),
    ));
    wait_until(|| {
        let context = Arc::clone(&context);
        async move { context.is_page_loading() }
    })
    .await;

    inspector.emit(InspectorEvent::new("Page.loadEventFired", json!({ "timestamp": 1.5 })));
    context.wait_for_page_to_load().await.unwrap();
    assert!(!context.is_page_loading());

    // Reload on the main frame starts over.
    assert_eq!(context.snapshot().await.main_document, None);
}

#[tokio::test]
async fn test_entered_frame_is_not_its_own_replacement() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    inspector.add_iframe(NodeId(20), NodeId(21));

    // Insertion of 10 seen from the main frame, before switching into it.
    context.dom_has_changed(inserted(10, PARENT, 11)).await.unwrap();
    assert_eq!(context.snapshot().await.pending_insertions, 1);
    enter_iframe(&inspector, &context, 10, 11).await;
    assert_eq!(context.snapshot().await.pending_insertions, 0);

    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();
    inspector.remove_node(NodeId(10));
    context.dom_has_changed(removed(10)).await.unwrap();

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.readiness, Readiness::Ready);
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.pending_insertions, 0);
    assert!(context.ambiguous_replacement().await.is_none());
    assert_eq!(current_document(&context).await, Some(NodeId(21)));
}

#[tokio::test]
async fn test_entered_frame_removed_before_replacement_waits() {
    let (inspector, context) = setup();
    establish_main(&inspector, &context).await;
    inspector.add_iframe(NodeId(20), NodeId(21));

    context.dom_has_changed(inserted(10, PARENT, 11)).await.unwrap();
    enter_iframe(&inspector, &context, 10, 11).await;

    inspector.remove_node(NodeId(10));
    context.dom_has_changed(removed(10)).await.unwrap();
    let waiting = context.snapshot().await;
    assert_eq!(waiting.readiness, Readiness::AwaitingReplacement { parent: PARENT });
    assert_eq!(waiting.iframe, Some(NodeId(10)));

    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.readiness, Readiness::Ready);
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.pending_insertions, 0);
    assert_eq!(current_document(&context).await, Some(NodeId(21)));
}

#[tokio::test]
async fn test_late_insertion_of_current_frame_is_dropped_on_removal() {
    let (inspector, context) = setup();
    enter_iframe(&inspector, &context, 10, 11).await;
    inspector.add_iframe(NodeId(20), NodeId(21));

    // Notification for the current frame delivered after the switch.
    context.dom_has_changed(inserted(10, PARENT, 11)).await.unwrap();
    context.dom_has_changed(inserted(20, PARENT, 21)).await.unwrap();
    assert_eq!(context.snapshot().await.pending_insertions, 2);

    context.dom_has_changed(removed(10)).await.unwrap();

    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.readiness, Readiness::Ready);
    assert_eq!(snapshot.pending_insertions, 0);
    assert!(context.ambiguous_replacement().await.is_none());
}

const SLOW: Duration = Duration::from_millis(500);
const PROMPT: Duration = Duration::from_millis(200);

/// Inspector whose frame resolution calls take [`SLOW`]
#[derive(Debug)]
struct SlowInspector {
    inner: Arc<MockInspector>,
}

#[async_trait]
impl Inspector for SlowInspector {
    fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    async fn document_root(&self) -> Result<NodeId, Error> {
        self.inner.document_root().await
    }

    async fn main_window(&self) -> Result<ObjectId, Error> {
        self.inner.main_window().await
    }

    async fn resolve_node(&self, node: NodeId) -> Result<ObjectId, Error> {
        self.inner.resolve_node(node).await
    }

    async fn request_node(&self, object: &ObjectId) -> Result<NodeId, Error> {
        self.inner.request_node(object).await
    }

    async fn call_function_on(&self, object: &ObjectId, declaration: &str) -> Result<RemoteValue, Error> {
        tokio::time::sleep(SLOW).await;
        self.inner.call_function_on(object, declaration).await
    }

    async fn content_document(&self, node: NodeId) -> Result<NodeId, Error> {
        tokio::time::sleep(SLOW).await;
        self.inner.content_document(node).await
    }

    async fn exists(&self, node: NodeId) -> Result<bool, Error> {
        tokio::time::sleep(SLOW).await;
        self.inner.exists(node).await
    }

    async fn subscribe_events(&self) -> Result<tokio::sync::mpsc::Receiver<InspectorEvent>, Error> {
        self.inner.subscribe_events().await
    }

    async fn close(&self) -> Result<(), Error> {
        self.inner.close().await
    }
}

fn slow_setup() -> (Arc<MockInspector>, Arc<SlowInspector>, Arc<DomContext>) {
    let inner = Arc::new(MockInspector::new());
    let slow = Arc::new(SlowInspector { inner: inner.clone() });
    let context = Arc::new(DomContext::new(slow.clone(), fast_timeouts()));
    (inner, slow, context)
}

async fn enter_slow_iframe(inner: &MockInspector, slow: &Arc<SlowInspector>, context: &DomContext) {
    let window = inner.add_iframe(NodeId(10), NodeId(11));
    context
        .set_current_frame(
            Some(RemoteElement::new(NodeId(10), slow.clone())),
            Some(RemoteElement::new(NodeId(11), slow.clone())),
            Some(RemoteObject::new(window, slow.clone())),
        )
        .await;
}

#[tokio::test]
async fn test_readers_are_not_blocked_by_slow_reload() {
    let (inner, slow, context) = slow_setup();
    enter_slow_iframe(&inner, &slow, &context).await;

    let reload = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.reset().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let document = timeout(PROMPT, context.get_document())
        .await
        .expect("get_document waited for the reload")
        .unwrap();
    assert_eq!(document.map(|d| d.node_id()), Some(NodeId(11)));

    let window = timeout(PROMPT, context.get_window())
        .await
        .expect("get_window waited for the reload");
    assert_eq!(window.map(|w| w.id().clone()), Some(MockInspector::frame_window_object(NodeId(10))));
    assert!(!timeout(PROMPT, context.is_on_main_frame()).await.unwrap());
    assert!(!reload.is_finished());

    reload.await.unwrap();
    assert_eq!(context.snapshot().await.iframe, Some(NodeId(10)));
}

#[tokio::test]
async fn test_readers_are_not_blocked_by_slow_replacement() {
    let (inner, slow, context) = slow_setup();
    enter_slow_iframe(&inner, &slow, &context).await;
    inner.add_iframe(NodeId(20), NodeId(21));
    context.dom_has_changed(removed(10)).await.unwrap();

    let assignment = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.dom_has_changed(inserted(20, PARENT, 21)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let readiness = timeout(PROMPT, context.readiness()).await.unwrap();
    assert_eq!(readiness, Readiness::AwaitingReplacement { parent: PARENT });
    let window = timeout(PROMPT, context.get_window()).await.unwrap();
    assert_eq!(window.map(|w| w.id().clone()), Some(MockInspector::frame_window_object(NodeId(10))));

    // The poll budget is 50ms; it must run out on time rather than wait for the assignment.
    let result = timeout(PROMPT, context.get_document())
        .await
        .expect("get_document exceeded its poll budget");
    assert!(matches!(result, Err(Error::Timeout(_))));

    assignment.await.unwrap().unwrap();
    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, Some(NodeId(20)));
    assert_eq!(snapshot.readiness, Readiness::Ready);
}

#[tokio::test]
async fn test_explicit_switch_wins_over_slow_replacement() {
    let (inner, slow, context) = slow_setup();
    enter_slow_iframe(&inner, &slow, &context).await;
    inner.add_iframe(NodeId(20), NodeId(21));
    context.dom_has_changed(removed(10)).await.unwrap();

    let assignment = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.dom_has_changed(inserted(20, PARENT, 21)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    timeout(PROMPT, context.set_current_frame(None, None, None))
        .await
        .expect("switch waited for the assignment");
    assert!(context.is_on_main_frame().await);

    assignment.await.unwrap().unwrap();
    let snapshot = context.snapshot().await;
    assert_eq!(snapshot.iframe, None);
    assert_eq!(snapshot.readiness, Readiness::Ready);
}

#[tokio::test]
async fn test_frame_died_does_not_block_readers() {
    let (inner, slow, context) = slow_setup();
    enter_slow_iframe(&inner, &slow, &context).await;
    context.dom_has_changed(removed(10)).await.unwrap();
    inner.remove_node(NodeId(10));

    let check = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.frame_died().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let readiness = timeout(PROMPT, context.readiness()).await.unwrap();
    assert_eq!(readiness, Readiness::AwaitingReplacement { parent: PARENT });

    check.await.unwrap();
    assert_eq!(context.readiness().await, Readiness::Ready);
}
