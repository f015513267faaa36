//! Event pump feeding inspector notifications into a [`DomContext`]

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use super::engine::DomContext;
use super::events::{DomEvent, PageEvent};
use crate::inspector::InspectorEvent;
use crate::Error;

/// Background task applying events to one context, in delivery order
#[derive(Debug)]
pub struct EventPump {
    handle: JoinHandle<()>,
}

impl EventPump {
    /// Subscribe to the context's inspector and start pumping
    pub async fn start(context: Arc<DomContext>) -> Result<Self, Error> {
        let events = context.inspector().subscribe_events().await?;
        Ok(Self::spawn(context, events))
    }

    /// Pump an existing event receiver into `context`
    pub fn spawn(context: Arc<DomContext>, events: mpsc::Receiver<InspectorEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut stream = ReceiverStream::new(events);
            debug!("Event pump started");

            while let Some(event) = stream.next().await {
                Self::apply(&context, event).await;
            }

            info!("Event pump stopped: inspector event stream closed");
        });

        Self { handle }
    }

    async fn apply(context: &DomContext, event: InspectorEvent) {
        if let Some(page_event) = PageEvent::from_inspector(&event) {
            match page_event {
                PageEvent::TopFrameNavigated => context.page_load_started(),
                PageEvent::LoadEventFired => context.signal_new_page_load_received().await,
                PageEvent::FrameDetached => context.frame_died().await,
            }
            return;
        }

        let dom_event = DomEvent::from_inspector(&event);
        if dom_event.is_other() {
            return;
        }

        if let Err(e) = context.dom_has_changed(dom_event).await {
            error!("Failed to apply {} to context: {}", event.method, e);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
