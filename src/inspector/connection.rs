//! Inspector WebSocket connection implementation
//!
//! JSON-RPC over one WebSocket: a reader task owns the incoming half and
//! routes responses to their waiters and notifications to subscribers, while
//! commands are written through the shared outgoing half.

use super::traits::{InspectorConnection, InspectorError, InspectorEvent, InspectorResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingTable = Arc<Mutex<HashMap<u64, PendingCommand>>>;
type SubscriberList = Arc<Mutex<Vec<mpsc::UnboundedSender<InspectorEvent>>>>;

/// Per-method response timeouts
#[derive(Debug, Clone)]
pub struct CommandTimeouts {
    /// Default timeout for most commands
    pub default: Duration,
    /// Timeout for page navigation commands
    pub navigation: Duration,
    /// Timeout for JavaScript execution
    pub execution: Duration,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(30),
            navigation: Duration::from_secs(60),
            execution: Duration::from_secs(30),
        }
    }
}

impl CommandTimeouts {
    /// Get timeout duration for a specific command method
    pub fn for_method(&self, method: &str) -> Duration {
        let method_lower = method.to_lowercase();

        if method_lower.contains("navigate") || method_lower.contains("reload") {
            return self.navigation;
        }

        if method_lower.starts_with("runtime.evaluate") || method_lower.starts_with("runtime.call") {
            return self.execution;
        }

        self.default
    }
}

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: oneshot::Sender<InspectorResponse>,
    /// Command method (for logging)
    method: String,
}

/// Inspector WebSocket connection implementation
pub struct DevToolsConnection {
    /// WebSocket URL
    url: String,
    /// Outgoing half of the socket
    sink: Mutex<SplitSink<WsStream, Message>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending: PendingTable,
    /// Event subscribers
    subscribers: SubscriberList,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Timeout configuration
    timeouts: CommandTimeouts,
}

impl std::fmt::Debug for DevToolsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevToolsConnection")
            .field("url", &self.url)
            .field("is_active", &self.is_active.load(Ordering::SeqCst))
            .finish()
    }
}

impl DevToolsConnection {
    /// Connect to an inspector WebSocket
    ///
    /// # Arguments
    /// * `url` - WebSocket debugger URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn connect<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        Self::connect_with_timeouts(url, CommandTimeouts::default()).await
    }

    /// Connect with explicit command timeouts
    pub async fn connect_with_timeouts<S: Into<String>>(
        url: S,
        timeouts: CommandTimeouts,
    ) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to inspector WebSocket: {}", url);

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect: {}", e)))?;
        let (sink, stream) = ws_stream.split();

        let connection = Arc::new(Self {
            url,
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            is_active: Arc::new(AtomicBool::new(true)),
            timeouts,
        });

        tokio::spawn(Self::read_loop(
            stream,
            Arc::clone(&connection.pending),
            Arc::clone(&connection.subscribers),
            Arc::clone(&connection.is_active),
        ));

        info!("Inspector WebSocket connection established");
        Ok(connection)
    }

    /// Message processing loop, runs until the socket closes
    async fn read_loop(
        mut stream: SplitStream<WsStream>,
        pending: PendingTable,
        subscribers: SubscriberList,
        is_active: Arc<AtomicBool>,
    ) {
        debug!("Inspector read loop started");

        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    Self::dispatch(&text, &pending, &subscribers).await;
                }
                Ok(Message::Close(_)) => {
                    info!("Inspector WebSocket close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Inspector WebSocket error, deactivating connection: {}", e);
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Dropping the senders wakes every waiter with a closed-channel error.
        let abandoned = pending.lock().await.drain().count();
        if abandoned > 0 {
            warn!("Inspector connection closed with {} commands in flight", abandoned);
        }
        debug!("Inspector read loop exited");
    }

    /// Route one incoming frame to its waiter or to the event subscribers
    async fn dispatch(text: &str, pending: &PendingTable, subscribers: &SubscriberList) {
        if let Ok(response) = serde_json::from_str::<InspectorRpcResponse>(text) {
            let waiter = pending.lock().await.remove(&response.id);
            match waiter {
                Some(command) => {
                    debug!("Response for command {}: {}", response.id, command.method);
                    let _ = command.sender.send(InspectorResponse {
                        id: response.id,
                        result: Some(response.result),
                        error: response.error.map(|e| InspectorError {
                            code: e.code,
                            message: e.message,
                            data: e.data,
                        }),
                    });
                }
                None => warn!("Received response for unknown command ID: {}", response.id),
            }
            return;
        }

        if let Ok(notification) = serde_json::from_str::<InspectorNotification>(text) {
            debug!("Received event: {}", notification.method);
            let event = InspectorEvent {
                method: notification.method,
                params: notification.params,
            };

            let mut subscribers = subscribers.lock().await;
            subscribers.retain(|sender| sender.send(event.clone()).is_ok());
            return;
        }

        warn!("Unknown message format: {}", text);
    }
}

#[async_trait]
impl InspectorConnection for DevToolsConnection {
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<InspectorResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = InspectorRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };

        let json = serde_json::to_string(&request)?;
        debug!("Sending inspector command {}: {}", id, json);

        let (sender, receiver) = oneshot::channel();
        self.pending.lock().await.insert(
            id,
            PendingCommand {
                sender,
                method: method.to_string(),
            },
        );

        let sent = self.sink.lock().await.send(Message::Text(json)).await;
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(Error::websocket(format!("Failed to send message: {}", e)));
        }

        let timeout = self.timeouts.for_method(method);
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::remote(format!(
                        "{}: {} (code: {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Connection closed before response to command {}",
                id
            ))),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(Error::timeout(format!("Command {} ({}) timed out", id, method)))
            }
        }
    }

    async fn listen_events(&self) -> Result<mpsc::Receiver<InspectorEvent>, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let (sender, receiver) = mpsc::channel(100);
        let (unbounded_sender, mut unbounded_receiver) = mpsc::unbounded_channel();

        self.subscribers.lock().await.push(unbounded_sender);

        // Forward events to bounded channel
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
        info!("Closing inspector WebSocket connection {}", self.url);

        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.sink.lock().await.close().await.map_err(|e| {
            error!("Failed to close inspector WebSocket: {}", e);
            Error::websocket(format!("Failed to close WebSocket: {}", e))
        })
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_for_method() {
        let timeouts = CommandTimeouts::default();

        assert_eq!(timeouts.for_method("Page.navigate"), Duration::from_secs(60));
        assert_eq!(timeouts.for_method("Page.reload"), Duration::from_secs(60));
        assert_eq!(timeouts.for_method("Runtime.callFunctionOn"), Duration::from_secs(30));
        assert_eq!(timeouts.for_method("DOM.describeNode"), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let result = DevToolsConnection::connect("ws://127.0.0.1:1/devtools/page/none").await;
        assert!(matches!(result, Err(Error::WebSocket(_))));
    }
}
