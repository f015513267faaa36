//! Session management traits

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::webview::Session;

/// Session manager trait
///
/// Owns every live session; command handlers look sessions up by id.
#[async_trait]
pub trait SessionManager: Send + Sync + std::fmt::Debug {
    /// Open a session with the given desired capabilities
    async fn create_session(&self, desired: Value) -> Result<Arc<Session>, crate::Error>;

    /// Get a session by ID
    async fn get_session(&self, session_id: &str) -> Result<Arc<Session>, crate::Error>;

    /// Close and forget a session
    async fn delete_session(&self, session_id: &str) -> Result<(), crate::Error>;

    /// List all session IDs
    async fn list_sessions(&self) -> Result<Vec<String>, crate::Error>;

    /// Close disconnected or idle sessions; returns how many were removed
    async fn cleanup(&self) -> Result<usize, crate::Error>;

    /// Get active session count
    fn session_count(&self) -> usize;
}
