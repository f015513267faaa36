//! Command executor
//!
//! Resolves the session of a request, runs the matching handler and wraps the
//! outcome in the response envelope.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::handlers;
use super::request::{CommandKind, CommandRequest};
use super::response::CommandResponse;
use crate::session::SessionManager;
use crate::Error;

/// Runs commands against the sessions of a manager
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    manager: Arc<dyn SessionManager>,
    implicit_wait_poll: Duration,
}

impl CommandExecutor {
    pub fn new(manager: Arc<dyn SessionManager>) -> Self {
        Self {
            manager,
            implicit_wait_poll: Duration::from_millis(250),
        }
    }

    /// Retry interval of element lookups under an implicit wait
    pub fn with_implicit_wait_poll(mut self, poll: Duration) -> Self {
        self.implicit_wait_poll = poll;
        self
    }

    pub fn manager(&self) -> &Arc<dyn SessionManager> {
        &self.manager
    }

    /// Execute one command; failures become non-zero statuses
    pub async fn execute(&self, request: CommandRequest) -> CommandResponse {
        debug!("Executing {} {:?}", request.kind, request.params);

        match self.run(&request).await {
            Ok((session_id, value)) => CommandResponse::success(session_id, value),
            Err(e) => {
                match &e {
                    Error::SessionNotFound(_) | Error::ElementNotFound(_) | Error::NoSuchFrame(_) => {
                        warn!("{} failed: {}", request.kind, e)
                    }
                    _ => error!("{} failed: {}", request.kind, e),
                }
                CommandResponse::failure(request.session_id().map(str::to_string), &e)
            }
        }
    }

    async fn run(&self, request: &CommandRequest) -> Result<(Option<String>, Value), Error> {
        match request.kind {
            CommandKind::NewSession => {
                let session = handlers::new_session(self.manager.as_ref(), request).await?;
                return Ok((Some(session.id().to_string()), session.capabilities().clone()));
            }
            CommandKind::DeleteSession => {
                let session_id = request.param("sessionId")?;
                let value = handlers::delete_session(self.manager.as_ref(), session_id).await?;
                return Ok((Some(session_id.to_string()), value));
            }
            _ => {}
        }

        let session = self.manager.get_session(request.param("sessionId")?).await?;
        let poll = self.implicit_wait_poll;

        let value = match request.kind {
            CommandKind::GetCapabilities => handlers::get_capabilities(&session).await?,
            CommandKind::GetTitle => handlers::get_title(&session).await?,
            CommandKind::GetWindowHandles => handlers::get_window_handles(&session).await?,
            CommandKind::IsEqual => handlers::is_equal(request).await?,
            CommandKind::Submit => handlers::submit(&session, request).await?,
            CommandKind::SetConfiguration => handlers::set_configuration(&session, request).await?,
            CommandKind::SetImplicitWaitTimeout => {
                handlers::set_implicit_wait_timeout(&session, request).await?
            }
            CommandKind::SwitchToFrame => handlers::switch_to_frame(&session, request).await?,
            CommandKind::FindElement | CommandKind::FindChildElement => {
                handlers::find_element(&session, request, poll).await?
            }
            CommandKind::FindElements | CommandKind::FindChildElements => {
                handlers::find_elements(&session, request, poll).await?
            }
            CommandKind::NewSession | CommandKind::DeleteSession => {
                return Err(Error::internal(format!("{} dispatched twice", request.kind)))
            }
        };

        Ok((Some(session.id().to_string()), value))
    }
}
