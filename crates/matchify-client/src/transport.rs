//! WebSocket transport for the client.
//!
//! Provides [`WsTransport`] which handles WebSocket I/O for text frames. This
//! is a thin layer that just opens sockets and moves text - protocol logic
//! remains in the Sans-IO [`Session`](crate::Session).
//!
//! Each socket runs in its own task and reports back as [`TransportEvent`]s
//! tagged with the [`ConnectionId`] it was opened under. Connection failures
//! are reported as [`TransportEvent::Closed`], never as errors to the caller.

use futures::{SinkExt, StreamExt};
use matchify_core::{ConnectionId, TransportEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No socket is open.
    #[error("not connected")]
    NotConnected,

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),

    /// Server closed the socket.
    #[error("closed by server: {0}")]
    ClosedByServer(String),
}

/// WebSocket transport handle.
///
/// Holds at most one socket. Opening a new one aborts the previous task.
pub struct WsTransport {
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    /// Outgoing frames for the live socket
    outgoing: Option<mpsc::UnboundedSender<String>>,
    task: Option<tokio::task::AbortHandle>,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WsTransport {
    /// Create a transport with no socket.
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self { events_tx, events_rx, outgoing: None, task: None }
    }

    /// Start connecting to `endpoint`.
    ///
    /// Returns immediately. The outcome arrives as `Opened` or `Closed`.
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self, id: ConnectionId, endpoint: &str) {
        self.abort();

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_socket(
            id,
            endpoint.to_string(),
            outgoing_rx,
            self.events_tx.clone(),
        ));

        self.outgoing = Some(outgoing_tx);
        self.task = Some(handle.abort_handle());
    }

    /// Queue a text frame on the live socket.
    pub fn send(&self, text: String) -> Result<(), TransportError> {
        let outgoing = self.outgoing.as_ref().ok_or(TransportError::NotConnected)?;
        outgoing.send(text).map_err(|_| TransportError::Stream("socket task exited".to_string()))
    }

    /// Close the live socket gracefully.
    ///
    /// The socket task sends a close frame once pending frames are flushed.
    pub fn close(&mut self) {
        self.outgoing = None;
        self.task = None;
    }

    /// Next transport event, if one is ready.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Wait for the next transport event.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events_rx.recv().await
    }

    fn abort(&mut self) {
        self.outgoing = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Run one socket and report how it ended.
async fn run_socket(
    id: ConnectionId,
    endpoint: String,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let reason = match drive_socket(id, &endpoint, &mut outgoing, &events).await {
        Ok(()) => "closed locally".to_string(),
        Err(e) => {
            tracing::debug!(%id, %endpoint, error = %e, "socket ended");
            e.to_string()
        },
    };

    let _ = events.send(TransportEvent::Closed { id, reason });
}

/// Bridge between the channels and the WebSocket until either side closes.
async fn drive_socket(
    id: ConnectionId,
    endpoint: &str,
    outgoing: &mut mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<(), TransportError> {
    let (ws, _) =
        connect_async(endpoint).await.map_err(|e| TransportError::Connection(e.to_string()))?;
    tracing::debug!(%id, %endpoint, "socket connected");

    let _ = events.send(TransportEvent::Opened { id });

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            text = outgoing.recv() => {
                let Some(text) = text else {
                    // Handle dropped: local close
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                };
                sink.send(Message::Text(text.into()))
                    .await
                    .map_err(|e| TransportError::Stream(e.to_string()))?;
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = events.send(TransportEvent::Frame { id, text: text.as_str().to_string() });
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.as_str().to_string())
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| "no reason given".to_string());
                        return Err(TransportError::ClosedByServer(reason));
                    },
                    // Ping/pong are answered by tungstenite; binary frames are not ours
                    Some(Ok(_)) => {},
                    Some(Err(e)) => return Err(TransportError::Stream(e.to_string())),
                    None => return Err(TransportError::Stream("connection reset".to_string())),
                }
            }
        }
    }
}
