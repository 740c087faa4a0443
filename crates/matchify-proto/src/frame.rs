//! JSON frames and their typed views.
//!
//! On the wire every frame is a JSON object tagged by `type`:
//!
//! ```text
//! {"type":"CONNECTED","connectedTo":{"username":"alice"}}   server -> client
//! {"type":"DISCONNECTED","reason":"peer left"}              server -> client
//! {"type":"MESSAGE","message":"hello","from":"<id>"}        both directions
//! {"type":"STATE","typing":true,"from":"<id>"}              both directions
//! ```
//!
//! Decoding is two-staged: the text is parsed into a JSON value and classified
//! by its `type` first, then the fields are deserialized. This keeps "not a
//! frame at all" apart from "a known frame with bad fields" in
//! [`ProtocolError`].
//!
//! # Invariants
//!
//! - Exactly one variant is active per decoded frame; there is no shared struct
//!   with optional fields.
//! - Decoding is a pure function of the input text.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProtocolError, Result};

/// Sender ID the server uses for its own notices.
pub const SYSTEM_SENDER: &str = "SYSTEM";

/// Reason used when a `DISCONNECTED` frame carries none.
pub const DEFAULT_DISCONNECT_REASON: &str = "peer disconnected";

/// Frame discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Pairing established.
    Connected,
    /// Peer or server ended the pairing.
    Disconnected,
    /// Chat message.
    Message,
    /// Typing state change.
    State,
}

impl FrameType {
    /// Wire spelling of the discriminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
            Self::Message => "MESSAGE",
            Self::State => "STATE",
        }
    }

    /// Parse a wire discriminator. `None` for unknown types.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONNECTED" => Some(Self::Connected),
            "DISCONNECTED" => Some(Self::Disconnected),
            "MESSAGE" => Some(Self::Message),
            "STATE" => Some(Self::State),
            _ => None,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle of the matched peer.
///
/// The server sends the peer's display name. It may be omitted, in which case
/// the peer is anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PeerIdentity {
    /// Display name. Empty when the server did not provide one.
    pub username: String,
}

impl PeerIdentity {
    /// Create an identity from a display name.
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }

    /// True if the server did not name the peer.
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }

    /// Name to show in the UI.
    pub fn display_name(&self) -> &str {
        if self.is_anonymous() { "stranger" } else { &self.username }
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Event decoded from a server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A peer was matched with us.
    PeerConnected {
        /// Who we were matched with.
        peer: PeerIdentity,
    },

    /// The pairing ended on the remote side.
    PeerDisconnected {
        /// Human-readable reason.
        reason: String,
    },

    /// Chat message.
    ChatMessage {
        /// ID of the sender ([`SYSTEM_SENDER`] for server notices).
        sender_id: String,
        /// Message text.
        text: String,
    },

    /// Typing indicator change.
    TypingState {
        /// ID of the typist.
        sender_id: String,
        /// Whether they are typing now.
        is_typing: bool,
    },
}

impl InboundEvent {
    /// Classify a raw server frame.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(match parse_frame(text)? {
            WireFrame::Connected(c) => Self::PeerConnected {
                peer: c
                    .connected_to
                    .map(|to| PeerIdentity::new(to.username.unwrap_or_default()))
                    .unwrap_or_default(),
            },
            WireFrame::Disconnected(d) => Self::PeerDisconnected {
                reason: d.reason.unwrap_or_else(|| DEFAULT_DISCONNECT_REASON.to_string()),
            },
            WireFrame::Message(m) => Self::ChatMessage { sender_id: m.from, text: m.message },
            WireFrame::State(s) => Self::TypingState { sender_id: s.from, is_typing: s.typing },
        })
    }

    /// Encode as a server frame.
    pub fn encode(&self) -> Result<String> {
        let wire = match self {
            Self::PeerConnected { peer } => WireFrame::Connected(ConnectedWire {
                connected_to: Some(ConnectedToWire { username: Some(peer.username.clone()) }),
            }),
            Self::PeerDisconnected { reason } => {
                WireFrame::Disconnected(DisconnectedWire { reason: Some(reason.clone()) })
            },
            Self::ChatMessage { sender_id, text } => {
                WireFrame::Message(MessageWire { message: text.clone(), from: sender_id.clone() })
            },
            Self::TypingState { sender_id, is_typing } => {
                WireFrame::State(StateWire { typing: *is_typing, from: sender_id.clone() })
            },
        };
        wire.encode()
    }

    /// Frame discriminator of this event.
    pub fn frame_type(&self) -> FrameType {
        match self {
            Self::PeerConnected { .. } => FrameType::Connected,
            Self::PeerDisconnected { .. } => FrameType::Disconnected,
            Self::ChatMessage { .. } => FrameType::Message,
            Self::TypingState { .. } => FrameType::State,
        }
    }
}

/// Frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Chat message.
    Message {
        /// Message text.
        text: String,
        /// Local user ID.
        from: String,
    },

    /// Typing state change.
    State {
        /// Whether the local user is typing.
        typing: bool,
        /// Local user ID.
        from: String,
    },
}

impl OutboundFrame {
    /// Encode as wire text.
    pub fn encode(&self) -> Result<String> {
        let wire = match self {
            Self::Message { text, from } => {
                WireFrame::Message(MessageWire { message: text.clone(), from: from.clone() })
            },
            Self::State { typing, from } => {
                WireFrame::State(StateWire { typing: *typing, from: from.clone() })
            },
        };
        wire.encode()
    }

    /// Decode a client frame (server side and tests).
    pub fn decode(text: &str) -> Result<Self> {
        match parse_frame(text)? {
            WireFrame::Message(m) => Ok(Self::Message { text: m.message, from: m.from }),
            WireFrame::State(s) => Ok(Self::State { typing: s.typing, from: s.from }),
            WireFrame::Connected(_) => Err(ProtocolError::WrongDirection(FrameType::Connected)),
            WireFrame::Disconnected(_) => {
                Err(ProtocolError::WrongDirection(FrameType::Disconnected))
            },
        }
    }

    /// Frame discriminator of this frame.
    pub fn frame_type(&self) -> FrameType {
        match self {
            Self::Message { .. } => FrameType::Message,
            Self::State { .. } => FrameType::State,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
enum WireFrame {
    Connected(ConnectedWire),
    Disconnected(DisconnectedWire),
    Message(MessageWire),
    State(StateWire),
}

impl WireFrame {
    fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectedWire {
    #[serde(rename = "connectedTo", default, skip_serializing_if = "Option::is_none")]
    connected_to: Option<ConnectedToWire>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectedToWire {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DisconnectedWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MessageWire {
    message: String,
    from: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateWire {
    typing: bool,
    from: String,
}

fn parse_frame(text: &str) -> Result<WireFrame> {
    let value: Value = serde_json::from_str(text).map_err(|e| ProtocolError::Json(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(ProtocolError::NotAnObject);
    };

    let Some(tag) = object.get("type").and_then(Value::as_str) else {
        return Err(ProtocolError::MissingType);
    };

    let Some(frame_type) = FrameType::parse(tag) else {
        return Err(ProtocolError::UnknownType(tag.to_string()));
    };

    serde_json::from_value(value)
        .map_err(|e| ProtocolError::InvalidFrame { frame_type, reason: e.to_string() })
}
