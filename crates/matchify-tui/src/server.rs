//! In-process simulated stranger.
//!
//! Stands in for the matching server when no `--server` is given. It speaks
//! the same JSON frames over channels instead of a socket, so the session
//! cannot tell the difference.
//!
//! The stranger pairs after a short delay, answers every message with a
//! typing burst and an echo, and leaves when told `bye`.

use std::time::Duration;

use matchify_client::{ConnectionId, PeerIdentity, TransportEvent};
use matchify_proto::{InboundEvent, OutboundFrame};
use tokio::sync::mpsc;

use crate::terminal::TerminalError;

/// Name the simulated stranger pairs under.
pub const STRANGER_NAME: &str = "stranger";

/// Delays used by the simulated stranger.
#[derive(Debug, Clone, Copy)]
pub struct StrangerTiming {
    /// From open until the pairing notice.
    pub pair_delay: Duration,
    /// Typing time before each reply.
    pub reply_delay: Duration,
}

impl Default for StrangerTiming {
    fn default() -> Self {
        Self { pair_delay: Duration::from_millis(1500), reply_delay: Duration::from_millis(900) }
    }
}

/// Channel transport to a simulated stranger.
///
/// Same shape as the WebSocket transport: one conversation at a time, events
/// tagged with the id they were opened under.
pub struct StrangerServer {
    timing: StrangerTiming,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
    task: Option<tokio::task::AbortHandle>,
}

impl Default for StrangerServer {
    fn default() -> Self {
        Self::new(StrangerTiming::default())
    }
}

impl StrangerServer {
    /// Create a server with the given delays.
    pub fn new(timing: StrangerTiming) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self { timing, events_tx, events_rx, outgoing: None, task: None }
    }

    /// Start a conversation. Must be called from within a tokio runtime.
    pub fn open(&mut self, id: ConnectionId, endpoint: &str) {
        self.abort();
        tracing::debug!(%id, %endpoint, "simulated stranger connecting");

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let handle =
            tokio::spawn(run_stranger(id, self.timing, outgoing_rx, self.events_tx.clone()));

        self.outgoing = Some(outgoing_tx);
        self.task = Some(handle.abort_handle());
    }

    /// Hand a frame to the stranger.
    pub fn send(&self, text: String) -> Result<(), TerminalError> {
        let outgoing = self.outgoing.as_ref().ok_or(TerminalError::NotConnected)?;
        outgoing.send(text).map_err(|_| TerminalError::ChannelSend)
    }

    /// End the conversation.
    pub fn close(&mut self) {
        self.abort();
    }

    /// Next event, if one is ready.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Wait for the next event.
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

impl Drop for StrangerServer {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Play one conversation.
async fn run_stranger(
    id: ConnectionId,
    timing: StrangerTiming,
    mut incoming: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let emit = |event: &InboundEvent| match event.encode() {
        Ok(text) => events.send(TransportEvent::Frame { id, text }).is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stranger failed to encode frame");
            false
        },
    };

    if events.send(TransportEvent::Opened { id }).is_err() {
        return;
    }
    tokio::time::sleep(timing.pair_delay).await;
    if !emit(&InboundEvent::PeerConnected { peer: PeerIdentity::new(STRANGER_NAME) }) {
        return;
    }

    while let Some(text) = incoming.recv().await {
        let message = match OutboundFrame::decode(&text) {
            Ok(OutboundFrame::Message { text, .. }) => text,
            Ok(OutboundFrame::State { .. }) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "stranger got a malformed frame");
                continue;
            },
        };

        if message.trim().eq_ignore_ascii_case("bye") {
            emit(&InboundEvent::PeerDisconnected { reason: format!("{STRANGER_NAME} left") });
            return;
        }

        let typing = |is_typing| InboundEvent::TypingState {
            sender_id: STRANGER_NAME.to_string(),
            is_typing,
        };
        emit(&typing(true));
        tokio::time::sleep(timing.reply_delay).await;
        emit(&typing(false));
        emit(&InboundEvent::ChatMessage {
            sender_id: STRANGER_NAME.to_string(),
            text: format!("you said: {message}"),
        });
    }
}
