//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use matchify_proto::Category;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Look for a stranger to chat with.
    StartSearch {
        /// Category to match on.
        category: Category,
    },

    /// Stop looking.
    Cancel,

    /// Leave the current chat.
    Disconnect,

    /// Send a chat message.
    SendMessage {
        /// Message text, verbatim.
        text: String,
    },

    /// The user pressed an editing key in the chat input.
    Typing,
}
