//! Application input events.
//!
//! This module defines [`AppEvent`], the comprehensive set of inputs that drive
//! the [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Session notifications translated by the [`crate::Bridge`].

use matchify_client::{EndReason, LogEntry};
use matchify_proto::{Category, PeerIdentity};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Search started.
    Searching {
        /// Category being searched.
        category: Category,
    },

    /// Matched with a stranger.
    Paired {
        /// Who we are chatting with.
        peer: PeerIdentity,
    },

    /// Message added to the chat log.
    MessageAppended(LogEntry),

    /// Remote typing indicator changed.
    PeerTyping {
        /// Whether the stranger is typing.
        is_typing: bool,
    },

    /// Session returned to idle.
    SessionEnded {
        /// Why it ended.
        reason: EndReason,
    },

    /// Error occurred.
    Error {
        /// Error message.
        message: String,
    },
}
