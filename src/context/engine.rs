//! Context synchronization engine
//!
//! Tracks the current window, document and iframe of a session, reconciles
//! asynchronous frame notifications against readers, and owns the page load
//! signal. The state lock is only held for short reads and commits; remote
//! calls made by a transition run outside it, and the result is committed only
//! if no other transition replaced the context in the meantime.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::events::{DomEvent, FrameInsertion};
use super::ledger::PendingFrameLedger;
use super::load::PageLoadSignal;
use crate::inspector::{Inspector, NodeId, ObjectId};
use crate::remote::{RemoteElement, RemoteObject};
use crate::Error;

/// Wait bounds of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ContextTimeouts {
    /// Delay between two readiness polls
    pub document_poll_interval: Duration,
    /// Number of readiness polls before giving up
    pub document_poll_retries: u32,
    /// Bound on a page load wait
    pub load_event_timeout: Duration,
}

impl Default for ContextTimeouts {
    fn default() -> Self {
        Self {
            document_poll_interval: Duration::from_millis(250),
            document_poll_retries: 20,
            load_event_timeout: Duration::from_secs(30),
        }
    }
}

/// Whether the current document can be handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// The current iframe was removed from `parent` and its replacement is not known yet
    AwaitingReplacement { parent: NodeId },
}

/// Several buffered insertions could replace the removed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguousReplacement {
    pub parent: NodeId,
    pub candidates: usize,
}

/// Identifier-level view of the context record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    pub window: Option<ObjectId>,
    pub document: Option<NodeId>,
    pub iframe: Option<NodeId>,
    pub main_window: Option<ObjectId>,
    pub main_document: Option<NodeId>,
    pub readiness: Readiness,
    pub pending_insertions: usize,
}

impl ContextSnapshot {
    pub fn is_on_main_frame(&self) -> bool {
        self.iframe.is_none()
    }
}

impl fmt::Display for ContextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Display>(value: &Option<T>) -> String {
            value.as_ref().map_or_else(|| "none".to_string(), |v| v.to_string())
        }

        write!(
            f,
            "window {} document {} iframe {} mainWindow {} mainDocument {} ({:?})",
            show(&self.window),
            show(&self.document),
            show(&self.iframe),
            show(&self.main_window),
            show(&self.main_document),
            self.readiness
        )
    }
}

#[derive(Debug)]
struct ContextState {
    window: Option<RemoteObject>,
    document: Option<RemoteElement>,
    iframe: Option<RemoteElement>,
    main_window: Option<RemoteObject>,
    main_document: Option<RemoteElement>,
    readiness: Readiness,
    ambiguous: Option<AmbiguousReplacement>,
    ledger: PendingFrameLedger,
    /// Bumped whenever the current frame is replaced
    generation: u64,
}

impl ContextState {
    fn new() -> Self {
        Self {
            window: None,
            document: None,
            iframe: None,
            main_window: None,
            main_document: None,
            readiness: Readiness::Ready,
            ambiguous: None,
            ledger: PendingFrameLedger::new(),
            generation: 0,
        }
    }

    fn set_current_frame(
        &mut self,
        iframe: Option<RemoteElement>,
        document: Option<RemoteElement>,
        window: Option<RemoteObject>,
    ) {
        match (&iframe, &document) {
            // Switch to default content.
            (None, None) => {
                self.document = self.main_document.clone();
                self.window = self.main_window.clone();
            }
            (None, Some(_)) => {
                self.main_document = document.clone();
                self.main_window = window.clone();
                self.document = document;
                self.window = window;
            }
            (Some(frame), _) => {
                // A frame that is current can no longer be someone's replacement.
                self.ledger.discard_node(frame.node_id());
                self.document = document;
                self.window = window;
            }
        }
        self.iframe = iframe;
        self.generation += 1;
        self.mark_ready();
    }

    fn new_context(&mut self) {
        self.window = None;
        self.document = None;
        self.iframe = None;
        self.main_document = None;
        self.generation += 1;
    }

    fn mark_ready(&mut self) {
        self.readiness = Readiness::Ready;
        self.ambiguous = None;
    }

    fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            window: self.window.as_ref().map(|w| w.id().clone()),
            document: self.document.as_ref().map(RemoteElement::node_id),
            iframe: self.iframe.as_ref().map(RemoteElement::node_id),
            main_window: self.main_window.as_ref().map(|w| w.id().clone()),
            main_document: self.main_document.as_ref().map(RemoteElement::node_id),
            readiness: self.readiness,
            pending_insertions: self.ledger.len(),
        }
    }
}

/// Current browsing context of one session
#[derive(Debug)]
pub struct DomContext {
    inspector: Arc<dyn Inspector>,
    state: Mutex<ContextState>,
    /// Serializes event driven transitions; never taken by readers
    transitions: Mutex<()>,
    page_load: PageLoadSignal,
    timeouts: ContextTimeouts,
}

impl DomContext {
    pub fn new(inspector: Arc<dyn Inspector>, timeouts: ContextTimeouts) -> Self {
        Self {
            inspector,
            state: Mutex::new(ContextState::new()),
            transitions: Mutex::new(()),
            page_load: PageLoadSignal::new(),
            timeouts,
        }
    }

    pub fn inspector(&self) -> &Arc<dyn Inspector> {
        &self.inspector
    }

    pub fn timeouts(&self) -> &ContextTimeouts {
        &self.timeouts
    }

    /// Current document, once no frame replacement is outstanding
    ///
    /// Polls readiness a bounded number of times. When the budget runs out the
    /// engine is forced back to ready, so the next call does not block again,
    /// and this call fails with `Timeout` (or `AmbiguousFrame` if several
    /// replacements were buffered for the removed frame).
    pub async fn get_document(&self) -> Result<Option<RemoteElement>, Error> {
        for _ in 0..self.timeouts.document_poll_retries {
            {
                let state = self.state.lock().await;
                if state.readiness == Readiness::Ready {
                    return Ok(state.document.clone());
                }
            }
            tokio::time::sleep(self.timeouts.document_poll_interval).await;
        }

        let mut state = self.state.lock().await;
        if state.readiness == Readiness::Ready {
            return Ok(state.document.clone());
        }

        let ambiguous = state.ambiguous;
        warn!("Document not ready, forcing context ready: {}", state.snapshot());
        state.mark_ready();

        match ambiguous {
            Some(a) => Err(Error::ambiguous_frame(a.parent, a.candidates)),
            None => Err(Error::timeout("Document not ready")),
        }
    }

    /// Current window, without waiting for readiness
    pub async fn get_window(&self) -> Option<RemoteObject> {
        self.state.lock().await.window.clone()
    }

    pub async fn is_on_main_frame(&self) -> bool {
        self.state.lock().await.iframe.is_none()
    }

    pub async fn readiness(&self) -> Readiness {
        self.state.lock().await.readiness
    }

    /// Outstanding ambiguous replacement, if any
    pub async fn ambiguous_replacement(&self) -> Option<AmbiguousReplacement> {
        self.state.lock().await.ambiguous
    }

    pub async fn snapshot(&self) -> ContextSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Make `iframe`/`document`/`window` current
    ///
    /// No iframe and no document switches back to the main document; no iframe
    /// with a document records it as the main document.
    pub async fn set_current_frame(
        &self,
        iframe: Option<RemoteElement>,
        document: Option<RemoteElement>,
        window: Option<RemoteObject>,
    ) {
        let mut state = self.state.lock().await;
        state.set_current_frame(iframe, document, window);
        debug!("Current frame set: {}", state.snapshot());
    }

    /// Clear the current and main handles
    ///
    /// The main window is kept.
    pub async fn new_context(&self) {
        let mut state = self.state.lock().await;
        state.new_context();
        debug!("New context: {}", state.snapshot());
    }

    /// Re-resolve the current iframe after a reload, or start a new context
    pub async fn reset(&self) {
        let _transition = self.transitions.lock().await;
        let (iframe, generation) = {
            let state = self.state.lock().await;
            (state.iframe.clone(), state.generation)
        };

        let resolved = match &iframe {
            Some(iframe) => match Self::resolve_frame(iframe).await {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    warn!("Iframe {} unusable after reload: {}", iframe.node_id(), e);
                    None
                }
            },
            None => None,
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Context replaced during reload, keeping {}", state.snapshot());
            return;
        }

        match (iframe, resolved) {
            (Some(iframe), Some((document, window))) => {
                info!("Reusing iframe {} after reload", iframe.node_id());
                state.set_current_frame(Some(iframe), Some(document), Some(window));
            }
            _ => state.new_context(),
        }
    }

    async fn resolve_frame(iframe: &RemoteElement) -> Result<(RemoteElement, RemoteObject), Error> {
        let document = iframe.content_document().await?;
        let window = iframe.content_window().await?;
        Ok((document, window))
    }

    /// Apply one DOM notification
    pub async fn dom_has_changed(&self, event: DomEvent) -> Result<(), Error> {
        let _transition = self.transitions.lock().await;

        let (insertion, generation) = {
            let mut state = self.state.lock().await;
            let generation = state.generation;

            match event {
                DomEvent::ChildNodeRemoved { node, parent } => {
                    let is_current = state.iframe.as_ref().is_some_and(|f| f.node_id() == node);
                    if !is_current {
                        return Ok(());
                    }

                    state.readiness = Readiness::AwaitingReplacement { parent };
                    state.ambiguous = None;
                    let stale = state.ledger.discard_node(node);
                    debug!("Current frame {} is gone, parent {}, {} stale insertions", node, parent, stale);

                    let candidates = state.ledger.by_parent(parent).to_vec();
                    match candidates.as_slice() {
                        [] => return Ok(()),
                        [entry] => {
                            state.ledger.remove(entry.id);
                            (entry.insertion.clone(), generation)
                        }
                        _ => {
                            warn!(
                                "Expected one replacement frame under parent {}, found {}",
                                parent,
                                candidates.len()
                            );
                            state.ambiguous = Some(AmbiguousReplacement {
                                parent,
                                candidates: candidates.len(),
                            });
                            return Ok(());
                        }
                    }
                }
                DomEvent::ChildIframeInserted(insertion) => match state.readiness {
                    Readiness::AwaitingReplacement { parent } if parent == insertion.parent => {
                        debug!("Replacement frame {} arrived", insertion.node);
                        (insertion, generation)
                    }
                    _ => {
                        state.ledger.add(insertion);
                        return Ok(());
                    }
                },
                DomEvent::Other => return Ok(()),
            }
        };

        self.assign_new_frame(&insertion, generation).await
    }

    /// Resolve the replacement frame, then make it current unless the context moved on
    async fn assign_new_frame(&self, insertion: &FrameInsertion, generation: u64) -> Result<(), Error> {
        let frame = RemoteElement::new(insertion.node, Arc::clone(&self.inspector));
        let document = RemoteElement::new(insertion.content_document, Arc::clone(&self.inspector));
        let window = frame.content_window().await?;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Frame {} resolved after the context changed, dropping it", insertion.node);
            return Ok(());
        }

        state.set_current_frame(Some(frame), Some(document), Some(window));
        debug!("New frame assigned: {}", state.snapshot());
        Ok(())
    }

    /// Release a pending replacement wait if the current iframe is gone
    pub async fn frame_died(&self) {
        let _transition = self.transitions.lock().await;
        let (iframe, generation) = {
            let state = self.state.lock().await;
            (state.iframe.clone(), state.generation)
        };

        let Some(iframe) = iframe else {
            return;
        };

        let gone = match iframe.exists().await {
            Ok(exists) => !exists,
            Err(e) => {
                warn!("Liveness check of iframe {} failed: {}", iframe.node_id(), e);
                true
            }
        };

        let mut state = self.state.lock().await;
        if gone && state.generation == generation {
            debug!("Current iframe {} died", iframe.node_id());
            state.mark_ready();
        }
    }

    /// Wait for the next page load signal
    pub async fn wait_for_load_event(&self) -> Result<(), Error> {
        self.page_load.wait(self.timeouts.load_event_timeout).await
    }

    /// Wait for the top-level load in flight; returns at once if none is
    pub async fn wait_for_page_to_load(&self) -> Result<(), Error> {
        self.page_load.wait_in_flight(self.timeouts.load_event_timeout).await
    }

    pub fn page_load_started(&self) {
        self.page_load.started();
    }

    pub fn is_page_loading(&self) -> bool {
        self.page_load.in_flight()
    }

    /// A full page load completed
    pub async fn signal_new_page_load_received(&self) {
        self.reset().await;
        self.page_load.signal();
        info!("Page load {} received", self.page_load.loads());
    }
}
