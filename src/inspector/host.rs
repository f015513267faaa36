//! Inspector host implementation
//!
//! Discovers debuggable pages through the HTTP endpoints of the remote web
//! view (`/json/list`, `/json/version`) and opens inspectors on them.

use super::client::DevToolsInspector;
use super::connection::DevToolsConnection;
use super::traits::*;
use super::types::TargetDescriptor;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Inspector host implementation
#[derive(Debug)]
pub struct DevToolsHost {
    /// HTTP discovery endpoint (e.g., "http://localhost:9222")
    endpoint: String,
    /// HTTP client for the discovery endpoints
    http: reqwest::Client,
    /// Open inspectors (target_id -> inspector)
    inspectors: Mutex<HashMap<String, Arc<DevToolsInspector>>>,
}

impl DevToolsHost {
    /// Create a new host controller
    ///
    /// # Arguments
    /// * `endpoint` - discovery endpoint; `ws://` endpoints are accepted and
    ///   rewritten to `http://`
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        let endpoint = endpoint
            .into()
            .replace("ws://", "http://")
            .replace("wss://", "https://")
            .trim_end_matches('/')
            .to_string();
        info!("Creating inspector host for endpoint: {}", endpoint);

        Self {
            endpoint,
            http: reqwest::Client::new(),
            inspectors: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the raw target descriptors
    async fn fetch_descriptors(&self) -> Result<Vec<TargetDescriptor>, Error> {
        let url = format!("{}/json/list", self.endpoint);
        debug!("Fetching targets from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::remote(format!("Failed to fetch targets: {}", e)))?;

        response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse targets: {}", e)))
    }
}

#[async_trait]
impl InspectorHost for DevToolsHost {
    async fn connect(&self, target_id: Option<&str>) -> Result<Arc<dyn Inspector>, Error> {
        let descriptors = self.fetch_descriptors().await?;

        let target = descriptors
            .into_iter()
            .filter(|d| d.target_type == "page")
            .find(|d| target_id.map_or(true, |id| d.id == id))
            .ok_or_else(|| {
                Error::remote(format!(
                    "No debuggable page{} at {}",
                    target_id.map(|id| format!(" {}", id)).unwrap_or_default(),
                    self.endpoint
                ))
            })?;

        let ws_url = target.web_socket_debugger_url.ok_or_else(|| {
            Error::remote(format!("Page {} is already attached to another client", target.id))
        })?;

        info!("Opening inspector on page {} ({})", target.id, target.url);
        let connection = DevToolsConnection::connect(ws_url).await?;
        let inspector = Arc::new(DevToolsInspector::new(connection));

        inspector.enable_domain("Page").await?;
        inspector.enable_domain("Runtime").await?;
        inspector.enable_domain("DOM").await?;

        self.inspectors
            .lock()
            .await
            .insert(target.id, Arc::clone(&inspector));

        Ok(inspector)
    }

    async fn list_targets(&self) -> Result<Vec<TargetInfo>, Error> {
        Ok(self
            .fetch_descriptors()
            .await?
            .into_iter()
            .map(|d| TargetInfo {
                target_id: d.id,
                target_type: d.target_type,
                title: d.title,
                url: d.url,
            })
            .collect())
    }

    async fn version(&self) -> Result<HostVersion, Error> {
        let url = format!("{}/json/version", self.endpoint);
        debug!("Fetching host version from {}", url);

        let version: serde_json::Value = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::remote(format!("Failed to connect to host: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse version: {}", e)))?;

        let field = |name: &str| {
            version
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string()
        };

        Ok(HostVersion {
            protocol_version: field("Protocol-Version"),
            product: field("Browser"),
            user_agent: field("User-Agent"),
        })
    }

    async fn close(&self) -> Result<(), Error> {
        info!("Closing inspectors opened through {}", self.endpoint);

        let inspectors: Vec<_> = self.inspectors.lock().await.drain().collect();
        for (target_id, inspector) in inspectors {
            if let Err(e) = inspector.close().await {
                warn!("Failed to close inspector for {}: {}", target_id, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        let host = DevToolsHost::new("ws://localhost:9222/");
        assert_eq!(host.endpoint, "http://localhost:9222");
    }

    #[tokio::test]
    async fn test_list_targets_unreachable() {
        let host = DevToolsHost::new("http://127.0.0.1:1");
        let result = host.list_targets().await;
        assert!(matches!(result, Err(Error::Remote(_))));
    }
}
