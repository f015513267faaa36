//! Configuration management for Webview-Driver

use crate::context::ContextTimeouts;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Inspector discovery endpoint (e.g. "http://localhost:9222")
    pub inspector_endpoint: String,

    /// Session timeout in seconds
    pub session_timeout: u64,

    /// Delay between two readiness polls of the current document, in milliseconds
    pub document_poll_interval_ms: u64,

    /// Number of readiness polls before the document wait gives up
    pub document_poll_retries: u32,

    /// Page load event wait bound in milliseconds
    pub load_event_timeout_ms: u64,

    /// Retry interval for element lookups under an implicit wait, in milliseconds
    pub implicit_wait_poll_ms: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5555,
            inspector_endpoint: "http://localhost:9222".to_string(),
            session_timeout: 3600,
            document_poll_interval_ms: 250,
            document_poll_retries: 20,
            load_event_timeout_ms: 30000,
            implicit_wait_poll_ms: 250,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("WEBVIEW_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("WEBVIEW_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid WEBVIEW_PORT"))?;
        }

        if let Ok(endpoint) = env::var("WEBVIEW_INSPECTOR_ENDPOINT") {
            config.inspector_endpoint = endpoint;
        }

        if let Ok(timeout) = env::var("WEBVIEW_SESSION_TIMEOUT") {
            config.session_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid WEBVIEW_SESSION_TIMEOUT"))?;
        }

        if let Ok(interval) = env::var("WEBVIEW_DOCUMENT_POLL_INTERVAL_MS") {
            config.document_poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid WEBVIEW_DOCUMENT_POLL_INTERVAL_MS"))?;
        }

        if let Ok(retries) = env::var("WEBVIEW_DOCUMENT_POLL_RETRIES") {
            config.document_poll_retries = retries
                .parse()
                .map_err(|_| Error::configuration("Invalid WEBVIEW_DOCUMENT_POLL_RETRIES"))?;
        }

        if let Ok(timeout) = env::var("WEBVIEW_LOAD_EVENT_TIMEOUT_MS") {
            config.load_event_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid WEBVIEW_LOAD_EVENT_TIMEOUT_MS"))?;
        }

        if let Ok(interval) = env::var("WEBVIEW_IMPLICIT_WAIT_POLL_MS") {
            config.implicit_wait_poll_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid WEBVIEW_IMPLICIT_WAIT_POLL_MS"))?;
        }

        if let Ok(log_level) = env::var("WEBVIEW_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Timing bounds for the per-session context engine
    pub fn context_timeouts(&self) -> ContextTimeouts {
        ContextTimeouts {
            document_poll_interval: Duration::from_millis(self.document_poll_interval_ms),
            document_poll_retries: self.document_poll_retries,
            load_event_timeout: Duration::from_millis(self.load_event_timeout_ms),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.document_poll_interval_ms == 0 {
            return Err(Error::configuration("document_poll_interval_ms must be positive"));
        }
        if self.implicit_wait_poll_ms == 0 {
            return Err(Error::configuration("implicit_wait_poll_ms must be positive"));
        }
        Ok(())
    }
}
