//! Session events, actions and observable state.

use std::fmt;

use matchify_core::{ConnectionAction, LogEntry, TransportEvent};
use matchify_proto::{Category, PeerIdentity};

/// Pairing state.
///
/// The peer handle lives inside [`PairingState::Paired`], so a session has a
/// peer exactly when it is paired. The transient "ended" state is never
/// stored: teardown reports [`SessionAction::Ended`] and lands in `Idle` in the
/// same step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PairingState {
    /// No pairing attempt in progress
    #[default]
    Idle,

    /// Waiting for the server to match us
    Searching {
        /// Category being searched
        category: Category,
    },

    /// Matched and chatting
    Paired {
        /// Who we are chatting with
        peer: PeerIdentity,
    },
}

impl PairingState {
    /// Discriminator without payload.
    pub fn phase(&self) -> PairingPhase {
        match self {
            Self::Idle => PairingPhase::Idle,
            Self::Searching { .. } => PairingPhase::Searching,
            Self::Paired { .. } => PairingPhase::Paired,
        }
    }

    /// Peer handle while paired.
    pub fn peer(&self) -> Option<&PeerIdentity> {
        match self {
            Self::Paired { peer } => Some(peer),
            Self::Idle | Self::Searching { .. } => None,
        }
    }

    /// True while paired.
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired { .. })
    }
}

/// Payload-free view of [`PairingState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairingPhase {
    /// No pairing attempt
    Idle,
    /// Waiting for a match
    Searching,
    /// Chatting
    Paired,
}

impl fmt::Display for PairingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Paired => "paired",
        })
    }
}

/// Why a session returned to idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// User cancelled the search
    Cancelled,
    /// User left the chat
    LocalDisconnect,
    /// Server reported the pairing over
    PeerLeft {
        /// Reason from the `DISCONNECTED` frame
        reason: String,
    },
    /// Transport failed or closed underneath us
    TransportLost {
        /// Transport close reason
        reason: String,
    },
}

impl EndReason {
    /// True if the local user ended the session.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Cancelled | Self::LocalDisconnect)
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("search cancelled"),
            Self::LocalDisconnect => f.write_str("you left the chat"),
            Self::PeerLeft { reason } => write!(f, "disconnected: {reason}"),
            Self::TransportLost { reason } => write!(f, "connection lost: {reason}"),
        }
    }
}

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Forwarding user intents (search, cancel, send, keystrokes)
/// - Reporting transport events tagged with their connection id
/// - Driving time forward via ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User wants to be matched.
    StartSearch {
        /// Category to search in
        category: Category,
    },

    /// User cancels the search (or leaves, if already paired).
    Cancel,

    /// User leaves the chat (or cancels, if still searching).
    Disconnect,

    /// User sends a chat message.
    SendMessage {
        /// Message text, sent verbatim
        text: String,
    },

    /// User pressed an editing key.
    Typing,

    /// Transport reported something.
    Transport(TransportEvent),

    /// Time tick for the typing debouncer.
    Tick,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Execute on the transport.
    Transport(ConnectionAction),

    /// Search began.
    SearchStarted {
        /// Category being searched
        category: Category,
    },

    /// Paired with a peer.
    PeerConnected {
        /// Who we are chatting with
        peer: PeerIdentity,
    },

    /// A message was added to the log.
    MessageAppended(LogEntry),

    /// Remote typing indicator changed.
    PeerTyping {
        /// Whether the peer is typing
        is_typing: bool,
    },

    /// Session returned to idle.
    Ended {
        /// Why it ended
        reason: EndReason,
    },
}

/// Read-only copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Pairing state
    pub state: PairingState,
    /// Message log in order
    pub messages: Vec<LogEntry>,
    /// Whether the peer is typing
    pub peer_typing: bool,
    /// Whether the local user is in a typing burst
    pub local_typing: bool,
    /// Whether the transport is open
    pub transport_open: bool,
}
