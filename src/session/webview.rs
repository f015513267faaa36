//! Automation session bound to one remote web view page

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::settings::SessionSettings;
use crate::context::{ContextTimeouts, DomContext, EventPump};
use crate::inspector::{Inspector, InspectorHost};
use crate::remote::{RemoteElement, RemoteObject};
use crate::Error;

/// One automation session
#[derive(Debug)]
pub struct Session {
    id: String,
    capabilities: Value,
    host: Arc<dyn InspectorHost>,
    inspector: Arc<dyn Inspector>,
    context: Arc<DomContext>,
    settings: SessionSettings,
    pump: EventPump,
    created_at: DateTime<Utc>,
    last_used: Mutex<DateTime<Utc>>,
}

impl Session {
    /// Attach to a page of `host` and start tracking its context
    ///
    /// `desired` may name the page through `webview.targetId`.
    pub async fn open(
        host: Arc<dyn InspectorHost>,
        desired: Value,
        timeouts: ContextTimeouts,
    ) -> Result<Self, Error> {
        let target_id = desired
            .pointer("/webview/targetId")
            .and_then(Value::as_str)
            .map(str::to_string);

        let inspector = host.connect(target_id.as_deref()).await?;
        let context = Arc::new(DomContext::new(Arc::clone(&inspector), timeouts));
        let pump = EventPump::start(Arc::clone(&context)).await?;

        let capabilities = Self::capabilities_for(&host, desired).await;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        info!(session_id = %id, "Session opened");

        Ok(Self {
            id,
            capabilities,
            host,
            inspector,
            context,
            settings: SessionSettings::new(),
            pump,
            created_at: now,
            last_used: Mutex::new(now),
        })
    }

    /// Desired capabilities completed with what the host reports
    async fn capabilities_for(host: &Arc<dyn InspectorHost>, desired: Value) -> Value {
        let mut capabilities = json!({
            "browserName": "webview",
            "javascriptEnabled": true,
            "takesScreenshot": false,
            "handlesAlerts": false,
            "cssSelectorsEnabled": true,
        });

        match host.version().await {
            Ok(version) => {
                capabilities["version"] = json!(version.product);
                capabilities["protocolVersion"] = json!(version.protocol_version);
            }
            Err(e) => warn!("Failed to read host version: {}", e),
        }

        if let (Some(merged), Value::Object(desired)) = (capabilities.as_object_mut(), desired) {
            for (key, value) in desired {
                merged.entry(key).or_insert(value);
            }
        }
        capabilities
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    pub fn host(&self) -> &Arc<dyn InspectorHost> {
        &self.host
    }

    pub fn inspector(&self) -> &Arc<dyn Inspector> {
        &self.inspector
    }

    pub fn context(&self) -> &Arc<DomContext> {
        &self.context
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        self.inspector.is_active() && self.pump.is_running()
    }

    /// Record activity on the session
    pub fn touch(&self) {
        *self.last_used.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Utc::now();
    }

    /// Whether the session has been idle for longer than `timeout`
    pub fn is_expired(&self, timeout: Duration) -> bool {
        let last_used = *self.last_used.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        chrono::Duration::from_std(timeout)
            .map(|timeout| Utc::now() - last_used > timeout)
            .unwrap_or(false)
    }

    /// Current document, establishing the main frame on first use
    pub async fn document(&self) -> Result<RemoteElement, Error> {
        if let Some(document) = self.context.get_document().await? {
            return Ok(document);
        }

        if !self.context.is_on_main_frame().await {
            return Err(Error::no_such_frame("Current frame has no document"));
        }

        let root = self.inspector.document_root().await?;
        let window = self.inspector.main_window().await?;
        debug!(session_id = %self.id, "Main document established: {}", root);

        let document = RemoteElement::new(root, Arc::clone(&self.inspector));
        self.context
            .set_current_frame(
                None,
                Some(document.clone()),
                Some(RemoteObject::new(window, Arc::clone(&self.inspector))),
            )
            .await;
        Ok(document)
    }

    /// Current window, establishing the main frame on first use
    pub async fn window(&self) -> Result<RemoteObject, Error> {
        self.document().await?;
        self.context
            .get_window()
            .await
            .ok_or_else(|| Error::no_such_frame("Current frame has no window"))
    }

    pub async fn close(&self) -> Result<(), Error> {
        info!(session_id = %self.id, "Closing session");
        self.pump.stop();
        self.inspector.close().await
    }
}
