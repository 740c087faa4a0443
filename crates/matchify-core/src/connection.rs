//! Session connection state machine.
//!
//! Owns the lifecycle of the single transport a session uses. Uses the action
//! pattern: methods return actions for the driver to execute, and the driver
//! reports back with [`TransportEvent`]s. The state machine itself never
//! touches a socket.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐  open   ┌────────────┐  Opened/Frame  ┌──────┐
//! │ Idle │────────>│ Connecting │───────────────>│ Open │
//! └──────┘         └────────────┘                └──────┘
//!                        │                          │
//!                        │ close/Closed             │ close/Closed
//!                        ↓                          ↓
//!                   ┌────────┐                 ┌────────┐
//!                   │ Closed │<────────────────│ Closed │
//!                   └────────┘                 └────────┘
//! ```
//!
//! Every `open` allocates a fresh [`ConnectionId`]. Transport events carry the
//! id they were opened under, and events for any other id are stale: a late
//! close from a replaced socket never tears down its successor.

use std::fmt;

use crate::error::ConnectionError;

/// Identifies one transport attempt.
///
/// Ids increase monotonically per [`Connection`] and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id. Live ids come from [`Connection::open`].
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw id value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actions returned by the connection state machine.
///
/// The driver executes these in order:
/// - `Open`: Start connecting to `endpoint`, tagging events with `id`
/// - `Send`: Write one text frame to the open transport
/// - `Close`: Tear down the transport opened under `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Start a transport to this endpoint
    Open {
        /// Id to tag transport events with
        id: ConnectionId,
        /// Endpoint URL
        endpoint: String,
    },

    /// Send this text frame
    Send(String),

    /// Close the transport
    Close {
        /// Transport to close
        id: ConnectionId,
    },
}

/// Events reported by the driver about a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Transport finished connecting.
    Opened {
        /// Transport id
        id: ConnectionId,
    },

    /// A text frame arrived.
    Frame {
        /// Transport id
        id: ConnectionId,
        /// Raw frame text
        text: String,
    },

    /// Transport closed or failed to connect.
    Closed {
        /// Transport id
        id: ConnectionId,
        /// Why the transport went away
        reason: String,
    },
}

impl TransportEvent {
    /// Id of the transport this event belongs to.
    pub fn id(&self) -> ConnectionId {
        match self {
            Self::Opened { id } | Self::Frame { id, .. } | Self::Closed { id, .. } => *id,
        }
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport has been opened yet
    Idle,
    /// Open requested, waiting for the transport
    Connecting,
    /// Transport is open, frames may be sent
    Open,
    /// Transport closed (locally or remotely)
    Closed,
}

/// Connection state machine
///
/// Exactly one transport is live at a time. Opening a new endpoint while one is
/// live closes the old one first.
#[derive(Debug, Clone)]
pub struct Connection {
    state: ConnectionState,
    /// Endpoint of the live transport
    endpoint: Option<String>,
    /// Id of the live transport
    current: Option<ConnectionId>,
    next_id: u64,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// Create a connection in [`ConnectionState::Idle`] state
    pub fn new() -> Self {
        Self { state: ConnectionState::Idle, endpoint: None, current: None, next_id: 1 }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True if frames can be sent.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// True while a transport is connecting or open.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self.state, ConnectionState::Connecting | ConnectionState::Open)
    }

    /// Endpoint of the live transport, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Id of the live transport, if any.
    #[must_use]
    pub fn current_id(&self) -> Option<ConnectionId> {
        self.current
    }

    /// True if `id` is the live transport.
    #[must_use]
    pub fn is_current(&self, id: ConnectionId) -> bool {
        self.current == Some(id)
    }

    /// Open a transport to `endpoint`.
    ///
    /// No-op if a transport to the same endpoint is already live. A live
    /// transport to a different endpoint is closed first.
    pub fn open(&mut self, endpoint: &str) -> Vec<ConnectionAction> {
        if self.is_live() && self.endpoint.as_deref() == Some(endpoint) {
            tracing::debug!(endpoint, "transport already live, open ignored");
            return Vec::new();
        }

        let mut actions = self.close();

        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        self.state = ConnectionState::Connecting;
        self.endpoint = Some(endpoint.to_string());
        self.current = Some(id);

        tracing::debug!(%id, endpoint, "opening transport");
        actions.push(ConnectionAction::Open { id, endpoint: endpoint.to_string() });
        actions
    }

    /// Close the live transport.
    ///
    /// Idempotent: returns no actions when nothing is live.
    pub fn close(&mut self) -> Vec<ConnectionAction> {
        let Some(id) = self.current.take() else {
            return Vec::new();
        };

        self.endpoint = None;
        self.state = ConnectionState::Closed;

        tracing::debug!(%id, "closing transport");
        vec![ConnectionAction::Close { id }]
    }

    /// Prepare a text frame for sending.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::NotOpen` if the transport is not open
    pub fn send(&self, text: String) -> Result<ConnectionAction, ConnectionError> {
        if !self.is_open() {
            return Err(ConnectionError::NotOpen { state: self.state });
        }

        Ok(ConnectionAction::Send(text))
    }

    /// Apply a transport event to the lifecycle.
    ///
    /// Returns false for stale events (any id other than the live transport),
    /// which the caller must ignore.
    pub fn handle_event(&mut self, event: &TransportEvent) -> bool {
        let id = event.id();
        if !self.is_current(id) {
            tracing::debug!(%id, current = ?self.current, "stale transport event ignored");
            return false;
        }

        match event {
            TransportEvent::Opened { .. } | TransportEvent::Frame { .. } => {
                // A frame on a connecting transport means it is open
                self.state = ConnectionState::Open;
            },
            TransportEvent::Closed { reason, .. } => {
                tracing::debug!(%id, %reason, "transport closed");
                self.current = None;
                self.endpoint = None;
                self.state = ConnectionState::Closed;
            },
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "ws://localhost:8080/chat/artist";

    fn opened(conn: &mut Connection) -> ConnectionId {
        conn.open(ENDPOINT);
        let id = conn.current_id().unwrap();
        assert!(conn.handle_event(&TransportEvent::Opened { id }));
        id
    }

    #[test]
    fn open_allocates_id_and_connects() {
        let mut conn = Connection::new();
        let actions = conn.open(ENDPOINT);

        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], ConnectionAction::Open { endpoint, .. } if endpoint == ENDPOINT));
    }

    #[test]
    fn open_same_endpoint_is_noop() {
        let mut conn = Connection::new();
        conn.open(ENDPOINT);
        let id = conn.current_id();

        assert!(conn.open(ENDPOINT).is_empty());
        assert_eq!(conn.current_id(), id);
    }

    #[test]
    fn open_other_endpoint_closes_old_first() {
        let mut conn = Connection::new();
        let old = opened(&mut conn);

        let actions = conn.open("ws://localhost:8080/chat/movie");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], ConnectionAction::Close { id: old });
        assert!(matches!(actions[1], ConnectionAction::Open { id, .. } if id > old));
        assert_eq!(conn.state(), ConnectionState::Connecting);
    }

    #[test]
    fn send_requires_open() {
        let mut conn = Connection::new();
        assert_eq!(
            conn.send("x".into()),
            Err(ConnectionError::NotOpen { state: ConnectionState::Idle })
        );

        conn.open(ENDPOINT);
        assert_eq!(
            conn.send("x".into()),
            Err(ConnectionError::NotOpen { state: ConnectionState::Connecting })
        );

        let id = conn.current_id().unwrap();
        conn.handle_event(&TransportEvent::Opened { id });
        assert_eq!(conn.send("x".into()), Ok(ConnectionAction::Send("x".into())));
    }

    #[test]
    fn frame_while_connecting_opens() {
        let mut conn = Connection::new();
        conn.open(ENDPOINT);
        let id = conn.current_id().unwrap();

        assert!(conn.handle_event(&TransportEvent::Frame { id, text: "{}".into() }));
        assert!(conn.is_open());
    }

    #[test]
    fn close_is_idempotent() {
        let mut conn = Connection::new();
        assert!(conn.close().is_empty());
        assert_eq!(conn.state(), ConnectionState::Idle);

        let id = opened(&mut conn);
        assert_eq!(conn.close(), vec![ConnectionAction::Close { id }]);
        assert_eq!(conn.state(), ConnectionState::Closed);

        assert!(conn.close().is_empty());
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn stale_events_ignored() {
        let mut conn = Connection::new();
        let old = opened(&mut conn);
        conn.close();
        let new = opened(&mut conn);

        assert!(!conn.handle_event(&TransportEvent::Closed { id: old, reason: "late".into() }));
        assert!(conn.is_open());
        assert!(conn.is_current(new));
    }

    #[test]
    fn remote_close_ends_transport() {
        let mut conn = Connection::new();
        let id = opened(&mut conn);

        assert!(conn.handle_event(&TransportEvent::Closed { id, reason: "reset".into() }));
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(conn.current_id().is_none());
        assert!(conn.close().is_empty());
    }
}
