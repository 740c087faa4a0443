//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and session
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mirrors the pairing state, message list and typing flag for rendering.
//! - Owns the text input and the selected find category.
//! - Stores terminal dimensions to handle resize events.
//! - Keeps a transient status line for user feedback.
//!
//! The view only changes in response to session notifications; user intents
//! go out as actions and come back as events once the session accepted them.

use matchify_client::{LocalIdentity, LogEntry, PairingPhase, PairingState};
use matchify_proto::{Category, PeerIdentity};

use crate::{AppAction, AppEvent, InputState};

/// Status line shown for `/help`.
pub const HELP_TEXT: &str = "/find [artists|albums|movies]  /cancel  /leave  /quit  (Tab: category, Esc: back)";

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Pairing state as last reported by the session.
    state: PairingState,
    /// Local user.
    identity: LocalIdentity,
    /// Chat log of the current pairing.
    messages: Vec<LogEntry>,
    /// Whether the stranger is typing.
    peer_typing: bool,
    /// Category used by the next search.
    category: Category,
    /// Text input.
    input: InputState,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App for the given local user.
    pub fn new(identity: LocalIdentity) -> Self {
        Self {
            state: PairingState::Idle,
            identity,
            messages: Vec::new(),
            peer_typing: false,
            category: Category::default(),
            input: InputState::new(),
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => {
                let mut input = std::mem::take(&mut self.input);
                let actions = input.handle_key(key, self);
                self.input = input;
                actions
            },
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Searching { category } => {
                self.state = PairingState::Searching { category };
                self.category = category;
                self.clear_conversation();
                self.status_message = Some(format!("Finding someone who loves {category}..."));
                vec![AppAction::Render]
            },
            AppEvent::Paired { peer } => {
                self.status_message = Some(format!("You're now chatting with {peer}"));
                self.state = PairingState::Paired { peer };
                self.clear_conversation();
                vec![AppAction::Render]
            },
            AppEvent::MessageAppended(entry) => {
                if self.state.is_paired() {
                    self.messages.push(entry);
                } else {
                    tracing::debug!(sequence = entry.sequence, "message outside a chat not shown");
                }
                vec![AppAction::Render]
            },
            AppEvent::PeerTyping { is_typing } => {
                self.peer_typing = is_typing && self.state.is_paired();
                vec![AppAction::Render]
            },
            AppEvent::SessionEnded { reason } => {
                self.state = PairingState::Idle;
                self.clear_conversation();
                self.status_message = Some(capitalize(&reason.to_string()));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Look for a stranger in `category`.
    pub fn start_search(&mut self, category: Category) -> Vec<AppAction> {
        match self.phase() {
            PairingPhase::Idle => {
                self.category = category;
                vec![AppAction::StartSearch { category }, AppAction::Render]
            },
            PairingPhase::Searching => {
                self.status_message = Some("Already searching (/cancel to stop)".to_string());
                vec![AppAction::Render]
            },
            PairingPhase::Paired => {
                self.status_message = Some("Leave this chat first (/leave)".to_string());
                vec![AppAction::Render]
            },
        }
    }

    /// Stop searching.
    pub fn cancel(&mut self) -> Vec<AppAction> {
        if self.phase() == PairingPhase::Searching {
            vec![AppAction::Cancel, AppAction::Render]
        } else {
            self.status_message = Some("Not searching".to_string());
            vec![AppAction::Render]
        }
    }

    /// Leave the current chat.
    pub fn leave(&mut self) -> Vec<AppAction> {
        if self.phase() == PairingPhase::Paired {
            vec![AppAction::Disconnect, AppAction::Render]
        } else {
            self.status_message = Some("Not in a chat".to_string());
            vec![AppAction::Render]
        }
    }

    /// Send a chat message.
    pub fn send_message(&mut self, text: String) -> Vec<AppAction> {
        if self.phase() == PairingPhase::Paired {
            vec![AppAction::SendMessage { text }, AppAction::Render]
        } else {
            self.status_message = Some("Not in a chat. Type /find to meet someone".to_string());
            vec![AppAction::Render]
        }
    }

    /// Escape: back out of whatever is happening, or quit from the lobby.
    pub fn back(&mut self) -> Vec<AppAction> {
        match self.phase() {
            PairingPhase::Idle => self.quit(),
            PairingPhase::Searching => self.cancel(),
            PairingPhase::Paired => self.leave(),
        }
    }

    /// Select the next category. Only possible in the lobby.
    pub fn cycle_category(&mut self) -> Vec<AppAction> {
        if self.phase() != PairingPhase::Idle {
            return vec![];
        }
        self.category = self.category.next();
        vec![AppAction::Render]
    }

    /// Choose the category for the next search.
    pub fn select_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Pairing state as last reported by the session.
    pub fn state(&self) -> &PairingState {
        &self.state
    }

    /// Payload-free pairing phase.
    pub fn phase(&self) -> PairingPhase {
        self.state.phase()
    }

    /// Stranger we are chatting with. `None` unless paired.
    pub fn peer(&self) -> Option<&PeerIdentity> {
        self.state.peer()
    }

    /// Whether a stranger is connected.
    pub fn is_connected(&self) -> bool {
        self.state.is_paired()
    }

    /// Local user.
    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    /// Messages of the current chat, in order.
    pub fn messages(&self) -> &[LogEntry] {
        &self.messages
    }

    /// Whether the stranger is typing.
    pub fn peer_typing(&self) -> bool {
        self.peer_typing
    }

    /// Category used by the next search.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Text input.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn clear_conversation(&mut self) {
        self.messages.clear();
        self.peer_typing = false;
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
