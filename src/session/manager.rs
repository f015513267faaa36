//! Session manager implementation
//!
//! Creates sessions through an inspector host factory and keeps them in a
//! thread-safe map.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

use super::traits::SessionManager;
use super::webview::Session;
use crate::context::ContextTimeouts;
use crate::inspector::InspectorHost;
use crate::Error;

type HostFactory = dyn Fn() -> Result<Arc<dyn InspectorHost>, Error> + Send + Sync;

/// Session manager implementation
pub struct SessionManagerImpl {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    host_factory: Arc<HostFactory>,
    timeouts: ContextTimeouts,
    session_timeout: Duration,
}

impl std::fmt::Debug for SessionManagerImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManagerImpl")
            .field("sessions", &self.session_count())
            .field("timeouts", &self.timeouts)
            .field("session_timeout", &self.session_timeout)
            .finish()
    }
}

impl SessionManagerImpl {
    /// Create a new session manager
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn InspectorHost>, Error> + Send + Sync + 'static,
    {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            host_factory: Arc::new(factory),
            timeouts: ContextTimeouts::default(),
            session_timeout: Duration::from_secs(3600),
        }
    }

    /// Create a session manager with a mock inspector host for testing
    pub fn mock() -> Self {
        Self::new(|| Ok(Arc::new(crate::inspector::mock::MockInspectorHost::new())))
    }

    /// Create a session manager whose sessions all attach to `host`
    pub fn with_host(host: Arc<dyn InspectorHost>) -> Self {
        Self::new(move || Ok(Arc::clone(&host)))
    }

    pub fn with_timeouts(mut self, timeouts: ContextTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }
}

#[cfg(test)]
impl Default for SessionManagerImpl {
    fn default() -> Self {
        Self::mock()
    }
}

#[async_trait]
impl SessionManager for SessionManagerImpl {
    async fn create_session(&self, desired: Value) -> Result<Arc<Session>, Error> {
        let host = (self.host_factory)()?;
        let session = Arc::new(Session::open(host, desired, self.timeouts.clone()).await?);

        self.sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(session.id().to_string(), Arc::clone(&session));

        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Arc<Session>, Error> {
        let session = self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::session_not_found(session_id))?;

        session.touch();
        Ok(session)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), Error> {
        let session = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;

        session.close().await
    }

    async fn list_sessions(&self) -> Result<Vec<String>, Error> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        Ok(sessions.keys().cloned().collect())
    }

    async fn cleanup(&self) -> Result<usize, Error> {
        let removed: Vec<Arc<Session>> = {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

            let stale: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| !s.is_active() || s.is_expired(self.session_timeout))
                .map(|(id, _)| id.clone())
                .collect();

            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };
        // Lock guard dropped here

        for session in &removed {
            info!(session_id = %session.id(), "Removing stale session");
            if let Err(e) = session.close().await {
                warn!(session_id = %session.id(), "Failed to close stale session: {}", e);
            }
        }

        Ok(removed.len())
    }

    fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}
