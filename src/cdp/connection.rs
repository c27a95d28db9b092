//! CDP WebSocket connection implementation
//!
//! This module provides WebSocket-based connection to Chrome DevTools Protocol.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingCommand>>>;

/// CDP timeout configuration
#[derive(Debug, Clone)]
struct CdpTimeoutConfig {
    /// Default timeout for most commands (seconds)
    default_timeout_secs: u64,
    /// Timeout for screenshot commands (seconds)
    screenshot_timeout_secs: u64,
    /// Timeout for page navigation commands (seconds)
    navigation_timeout_secs: u64,
    /// Timeout for JavaScript execution (seconds)
    execution_timeout_secs: u64,
}

impl Default for CdpTimeoutConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 30,
            screenshot_timeout_secs: 90,
            navigation_timeout_secs: 60,
            execution_timeout_secs: 30,
        }
    }
}

impl CdpTimeoutConfig {
    /// Get timeout duration for a specific command method
    fn get_timeout_for_command(&self, method: &str) -> tokio::time::Duration {
        let method_lower = method.to_lowercase();

        if method_lower.contains("screenshot") || method_lower.contains("capture") {
            return tokio::time::Duration::from_secs(self.screenshot_timeout_secs);
        }

        if method_lower.contains("navigate") {
            return tokio::time::Duration::from_secs(self.navigation_timeout_secs);
        }

        if method_lower.contains("runtime.evaluate") || method_lower.contains("runtime.call") {
            return tokio::time::Duration::from_secs(self.execution_timeout_secs);
        }

        tokio::time::Duration::from_secs(self.default_timeout_secs)
    }
}

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: tokio::sync::oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
///
/// Writes go through the split sink under a lock; a spawned reader task owns
/// the stream half and routes responses back to their waiting commands by id.
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// Write half of the WebSocket
    sink: Mutex<Option<SplitSink<WsStream, Message>>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: PendingMap,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Reader task
    reader: Mutex<Option<JoinHandle<()>>>,
    /// Timeout configuration
    timeout_config: CdpTimeoutConfig,
}

impl std::fmt::Debug for CdpWebSocketConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpWebSocketConnection")
            .field("url", &self.url)
            .field("is_active", &self.is_active.load(Ordering::SeqCst))
            .finish()
    }
}

impl CdpWebSocketConnection {
    /// Create a new CDP WebSocket connection
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn new<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to WebSocket: {}", url);

        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;

        let (sink, stream) = ws_stream.split();

        let connection = Arc::new(Self {
            url,
            sink: Mutex::new(Some(sink)),
            next_id: AtomicU64::new(1),
            pending_commands: Arc::new(Mutex::new(HashMap::new())),
            is_active: Arc::new(AtomicBool::new(true)),
            reader: Mutex::new(None),
            timeout_config: CdpTimeoutConfig::default(),
        });

        let reader = tokio::spawn(Self::read_loop(
            stream,
            Arc::clone(&connection.pending_commands),
            Arc::clone(&connection.is_active),
        ));
        *connection.reader.lock().await = Some(reader);

        info!("WebSocket connection established");
        Ok(connection)
    }

    /// Message processing loop, runs until the peer closes or errors
    async fn read_loop(
        mut stream: SplitStream<WsStream>,
        pending_commands: PendingMap,
        is_active: Arc<AtomicBool>,
    ) {
        debug!("CDP message loop started");

        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    Self::handle_message(&text, &pending_commands).await;
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    if is_active.load(Ordering::SeqCst) {
                        error!("WebSocket error: {}", e);
                    }
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Dropping the senders wakes every waiter with a closed-channel error
        let abandoned = {
            let mut pending = pending_commands.lock().await;
            let count = pending.len();
            pending.clear();
            count
        };
        if abandoned > 0 {
            warn!("CDP connection closed with {} commands in flight", abandoned);
        }

        debug!("CDP message loop exited");
    }

    /// Handle incoming WebSocket message
    async fn handle_message(text: &str, pending_commands: &PendingMap) {
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            Self::handle_response(response, pending_commands).await;
            return;
        }

        if let Ok(notification) = serde_json::from_str::<CdpNotification>(text) {
            debug!("Ignoring CDP event: {}", notification.method);
            return;
        }

        warn!("Unknown message format: {}", text);
    }

    /// Handle CDP response
    async fn handle_response(response: CdpRpcResponse, pending_commands: &PendingMap) {
        let pending_cmd = pending_commands.lock().await.remove(&response.id);

        match pending_cmd {
            Some(pending_cmd) => {
                debug!("Received response for command {}: {}", response.id, pending_cmd.method);

                let cdp_response = CdpResponse {
                    id: response.id,
                    result: Some(response.result),
                    error: response.error.map(|e| CdpErrorResponse {
                        code: e.code,
                        message: e.message,
                        data: e.data,
                    }),
                };

                let _ = pending_cmd.sender.send(cdp_response);
            }
            None => warn!("Received response for unknown command ID: {}", response.id),
        }
    }

    /// Send WebSocket message
    async fn send_message(&self, message: Message) -> Result<(), Error> {
        let mut sink_guard = self.sink.lock().await;
        let sink = sink_guard
            .as_mut()
            .ok_or_else(|| Error::websocket("WebSocket stream not available"))?;

        sink.send(message)
            .await
            .map_err(|e| Error::websocket(format!("Failed to send message: {}", e)))
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
            session_id: None,
        };

        let json = serde_json::to_string(&request)
            .map_err(|e| Error::cdp(format!("Failed to serialize request: {}", e)))?;

        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = tokio::sync::oneshot::channel();
        self.pending_commands.lock().await.insert(
            id,
            PendingCommand {
                sender,
                method: method.to_string(),
            },
        );

        if let Err(e) = self.send_message(Message::Text(json)).await {
            self.pending_commands.lock().await.remove(&id);
            return Err(e);
        }

        let timeout_duration = self.timeout_config.get_timeout_for_command(method);

        match tokio::time::timeout(timeout_duration, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{}: {} (code: {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Connection closed before {} (command {}) was answered",
                method, id
            ))),
            Err(_) => {
                self.pending_commands.lock().await.remove(&id);
                Err(Error::cdp(format!(
                    "Command {} ({}) got no response within {:?}",
                    id, method, timeout_duration
                )))
            }
        }
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            debug!("CDP connection to {} already closed", self.url);
            return Ok(());
        }

        info!("Closing CDP WebSocket connection to {}", self.url);

        let close_result = match self.sink.lock().await.take() {
            Some(mut sink) => sink
                .close()
                .await
                .map_err(|e| Error::websocket(format!("Failed to close WebSocket: {}", e))),
            None => Ok(()),
        };

        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }

        close_result
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_timeouts() {
        let config = CdpTimeoutConfig::default();
        assert_eq!(
            config.get_timeout_for_command("Page.captureScreenshot"),
            tokio::time::Duration::from_secs(90)
        );
        assert_eq!(
            config.get_timeout_for_command("Page.navigate"),
            tokio::time::Duration::from_secs(60)
        );
        assert_eq!(
            config.get_timeout_for_command("Runtime.callFunctionOn"),
            tokio::time::Duration::from_secs(30)
        );
        assert_eq!(
            config.get_timeout_for_command("Browser.close"),
            tokio::time::Duration::from_secs(30)
        );
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let result = CdpWebSocketConnection::new("ws://127.0.0.1:1/devtools/page/none").await;
        assert!(matches!(result, Err(Error::WebSocket(_))));
    }
}
