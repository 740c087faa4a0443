//! Session-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`matchify_client::Session`] and adapts it to the
//! application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`] intents into session events.
//! - Accumulates outgoing [`ConnectionAction`]s to be executed by the driver in
//!   the next I/O cycle.
//! - Converts session actions back into [`crate::AppEvent`]s for the view.
//! - Forwards ticks so the typing debouncer runs on real or virtual time.

use matchify_client::{
    ConnectionAction, Environment, LocalIdentity, Session, SessionAction, SessionConfig,
    SessionError, SessionEvent, TransportEvent,
};

use crate::{AppAction, AppEvent};

/// Bridge between App and the pairing session.
///
/// Generic over Environment to support both production and simulation.
pub struct Bridge<E: Environment> {
    session: Session<E>,
    outgoing: Vec<ConnectionAction>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge.
    pub fn new(env: E, identity: LocalIdentity, config: SessionConfig) -> Self {
        Self { session: Session::new(env, identity, config), outgoing: Vec::new() }
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::StartSearch { category } => SessionEvent::StartSearch { category },
            AppAction::Cancel => SessionEvent::Cancel,
            AppAction::Disconnect => SessionEvent::Disconnect,
            AppAction::SendMessage { text } => SessionEvent::SendMessage { text },
            AppAction::Typing => SessionEvent::Typing,
            AppAction::Render | AppAction::Quit => return vec![],
        };
        let result = self.session.handle(event);
        self.handle_session_result(result)
    }

    /// Handle an event reported by the transport.
    pub fn handle_transport(&mut self, event: TransportEvent) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Transport(event));
        self.handle_session_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self) -> Vec<AppEvent> {
        let result = self.session.handle(SessionEvent::Tick);
        self.handle_session_result(result)
    }

    /// Take pending transport actions.
    pub fn take_outgoing(&mut self) -> Vec<ConnectionAction> {
        std::mem::take(&mut self.outgoing)
    }

    /// Time until the next tick has work. `None` if nothing is pending.
    pub fn next_deadline(&self) -> Option<std::time::Duration> {
        self.session.next_deadline()
    }

    fn handle_session_result(
        &mut self,
        result: Result<Vec<SessionAction>, SessionError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_session_actions(actions),
            Err(e) if e.is_user_visible() => vec![AppEvent::Error { message: e.to_string() }],
            Err(e) => {
                tracing::debug!(error = %e, "session rejected input");
                vec![]
            },
        }
    }

    fn process_session_actions(&mut self, actions: Vec<SessionAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                SessionAction::Transport(action) => self.outgoing.push(action),
                SessionAction::SearchStarted { category } => {
                    events.push(AppEvent::Searching { category });
                },
                SessionAction::PeerConnected { peer } => events.push(AppEvent::Paired { peer }),
                SessionAction::MessageAppended(entry) => {
                    events.push(AppEvent::MessageAppended(entry));
                },
                SessionAction::PeerTyping { is_typing } => {
                    events.push(AppEvent::PeerTyping { is_typing });
                },
                SessionAction::Ended { reason } => events.push(AppEvent::SessionEnded { reason }),
            }
        }

        events
    }
}
