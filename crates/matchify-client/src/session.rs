//! Pairing session state machine.
//!
//! # State Machine
//!
//! ```text
//!            StartSearch            PeerConnected
//! ┌──────┐ ──────────────> ┌───────────┐ ─────────────> ┌────────┐
//! │ Idle │                 │ Searching │                │ Paired │<─┐ MESSAGE / STATE
//! └──────┘ <────────────── └───────────┘                └────────┘──┘
//!    ^      Cancel/Closed                                    │
//!    └───────────────────────────────────────────────────────┘
//!       Disconnect / PeerDisconnected / Closed  (via Ended)
//! ```
//!
//! Every teardown closes the transport, clears the message log, cancels the
//! typing timer and resets the remote typing flag before landing in `Idle`.
//!
//! # Invariants
//!
//! - Chat and typing frames only touch state while `Paired`; elsewhere they
//!   are dropped.
//! - The message log holds exactly the messages of the current pairing, in the
//!   order they were sent or decoded.
//! - Events from a replaced or closed transport are ignored.

use matchify_core::{
    Connection, ConnectionAction, Environment, MessageLog, TransportEvent, TypingDebouncer,
    TypingSignal, TypingTransition,
};
use matchify_proto::{Category, InboundEvent, OutboundFrame, PeerIdentity};

use crate::{
    EndReason, LocalIdentity, PairingPhase, PairingState, SessionAction, SessionConfig, SessionError,
    SessionEvent, SessionSnapshot,
};

/// Pairing session.
///
/// Owns the connection, the message log and both typing indicators. Generic
/// over the environment so the debounce clock can be virtual in tests.
pub struct Session<E: Environment> {
    env: E,
    identity: LocalIdentity,
    config: SessionConfig,
    state: PairingState,
    connection: Connection,
    log: MessageLog,
    /// Local typing bursts
    typing: TypingDebouncer<E::Instant>,
    /// Remote typing slot
    peer_typing: TypingSignal,
}

impl<E: Environment> Session<E> {
    /// Create an idle session.
    pub fn new(env: E, identity: LocalIdentity, config: SessionConfig) -> Self {
        let typing = TypingDebouncer::new(config.quiet_interval);
        Self {
            env,
            identity,
            config,
            state: PairingState::Idle,
            connection: Connection::new(),
            log: MessageLog::new(),
            typing,
            peer_typing: TypingSignal::default(),
        }
    }

    /// Current pairing state.
    pub fn state(&self) -> &PairingState {
        &self.state
    }

    /// Local identity.
    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    /// Configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Message log of the current pairing.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Connection lifecycle.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Whether the peer is typing.
    pub fn peer_typing(&self) -> bool {
        self.peer_typing.is_typing
    }

    /// Whether the local user is in a typing burst.
    pub fn local_typing(&self) -> bool {
        self.typing.is_typing()
    }

    /// Time until the next [`SessionEvent::Tick`] has work. `None` if idle.
    pub fn next_deadline(&self) -> Option<std::time::Duration> {
        self.typing.remaining(self.env.now())
    }

    /// Immutable copy of the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            messages: self.log.snapshot(),
            peer_typing: self.peer_typing.is_typing,
            local_typing: self.typing.is_typing(),
            transport_open: self.connection.is_open(),
        }
    }

    /// Process an event and return resulting actions.
    ///
    /// On error the session state is unchanged.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::StartSearch { category } => self.handle_start_search(category),
            SessionEvent::Cancel | SessionEvent::Disconnect => Ok(self.handle_leave()),
            SessionEvent::SendMessage { text } => self.handle_send_message(text),
            SessionEvent::Typing => Ok(self.handle_typing()),
            SessionEvent::Transport(event) => Ok(self.handle_transport(event)),
            SessionEvent::Tick => Ok(self.handle_tick()),
        }
    }

    fn handle_start_search(
        &mut self,
        category: Category,
    ) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != PairingState::Idle {
            return Err(SessionError::InvalidState {
                phase: self.state.phase(),
                operation: "start search",
            });
        }

        let endpoint = self.config.endpoint(category);
        tracing::info!(%category, %endpoint, "searching for a match");

        let mut actions = transport_actions(self.connection.open(&endpoint));
        self.state = PairingState::Searching { category };
        actions.push(SessionAction::SearchStarted { category });
        Ok(actions)
    }

    /// Cancel and disconnect share one teardown: a search is cancelled, a chat
    /// is left.
    fn handle_leave(&mut self) -> Vec<SessionAction> {
        match self.state {
            PairingState::Idle => {
                tracing::debug!("nothing to leave");
                Vec::new()
            },
            PairingState::Searching { .. } => self.teardown(EndReason::Cancelled),
            PairingState::Paired { .. } => self.teardown(EndReason::LocalDisconnect),
        }
    }

    fn handle_send_message(&mut self, text: String) -> Result<Vec<SessionAction>, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        if !self.state.is_paired() {
            return Err(SessionError::NotPaired);
        }

        let from = self.identity.user_id.clone();
        let encoded = OutboundFrame::Message { text: text.clone(), from: from.clone() }.encode()?;
        let send = self.connection.send(encoded)?;

        // Optimistic: logged before the server sees it, never rolled back
        let entry = self.log.append(from, text);

        Ok(vec![SessionAction::Transport(send), SessionAction::MessageAppended(entry)])
    }

    fn handle_typing(&mut self) -> Vec<SessionAction> {
        if !self.state.is_paired() {
            return Vec::new();
        }

        match self.typing.input(self.env.now()) {
            Some(transition) => self.send_typing(transition),
            None => Vec::new(),
        }
    }

    fn handle_tick(&mut self) -> Vec<SessionAction> {
        match self.typing.poll(self.env.now()) {
            Some(transition) => self.send_typing(transition),
            None => Vec::new(),
        }
    }

    /// Best-effort: typing frames that cannot be sent are dropped.
    fn send_typing(&mut self, transition: TypingTransition) -> Vec<SessionAction> {
        let frame =
            OutboundFrame::State { typing: transition.is_typing(), from: self.identity.user_id.clone() };

        let text = match frame.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode typing frame");
                return Vec::new();
            },
        };

        match self.connection.send(text) {
            Ok(action) => vec![SessionAction::Transport(action)],
            Err(e) => {
                tracing::debug!(error = %e, ?transition, "typing signal dropped");
                Vec::new()
            },
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) -> Vec<SessionAction> {
        if !self.connection.handle_event(&event) {
            return Vec::new();
        }

        match event {
            TransportEvent::Opened { id } => {
                tracing::debug!(%id, "transport open, waiting for a match");
                Vec::new()
            },
            TransportEvent::Frame { text, .. } => match InboundEvent::decode(&text) {
                Ok(inbound) => self.handle_inbound(inbound),
                Err(e) => {
                    tracing::warn!(error = %e, unclassified = e.is_unclassified(), "dropping malformed frame");
                    Vec::new()
                },
            },
            TransportEvent::Closed { reason, .. } => match self.state {
                PairingState::Idle => Vec::new(),
                PairingState::Searching { .. } | PairingState::Paired { .. } => {
                    self.teardown(EndReason::TransportLost { reason })
                },
            },
        }
    }

    fn handle_inbound(&mut self, event: InboundEvent) -> Vec<SessionAction> {
        match (self.state.phase(), event) {
            (PairingPhase::Searching, InboundEvent::PeerConnected { peer }) => self.pair(peer),
            (
                PairingPhase::Searching | PairingPhase::Paired,
                InboundEvent::PeerDisconnected { reason },
            ) => self.teardown(EndReason::PeerLeft { reason }),
            (PairingPhase::Paired, InboundEvent::ChatMessage { sender_id, text }) => {
                let entry = self.log.append(sender_id, text);
                vec![SessionAction::MessageAppended(entry)]
            },
            (PairingPhase::Paired, InboundEvent::TypingState { sender_id, is_typing }) => {
                if self.peer_typing.set(&sender_id, is_typing) {
                    vec![SessionAction::PeerTyping { is_typing }]
                } else {
                    Vec::new()
                }
            },
            (phase, event) => {
                tracing::warn!(
                    %phase,
                    frame = %event.frame_type(),
                    "dropping frame not valid in this state"
                );
                Vec::new()
            },
        }
    }

    fn pair(&mut self, peer: PeerIdentity) -> Vec<SessionAction> {
        tracing::info!(peer = %peer, "paired");

        self.log.clear();
        self.peer_typing.reset();
        self.state = PairingState::Paired { peer: peer.clone() };

        vec![SessionAction::PeerConnected { peer }]
    }

    /// Close the transport and return to idle. Reports `Ended` last.
    fn teardown(&mut self, reason: EndReason) -> Vec<SessionAction> {
        tracing::info!(phase = %self.state.phase(), %reason, "session ended");

        let mut actions = transport_actions(self.connection.close());
        self.log.clear();
        self.typing.reset();
        self.peer_typing.reset();
        self.state = PairingState::Idle;

        actions.push(SessionAction::Ended { reason });
        actions
    }
}

fn transport_actions(actions: Vec<ConnectionAction>) -> Vec<SessionAction> {
    actions.into_iter().map(SessionAction::Transport).collect()
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use matchify_core::{ConnectionError, ConnectionId, ConnectionState};

    use super::*;

    #[derive(Clone, Default)]
    struct ManualEnv(Arc<AtomicU64>);

    impl ManualEnv {
        fn advance(&self, ms: u64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Environment for ManualEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::from_millis(self.0.load(Ordering::SeqCst))
        }
    }

    fn session() -> (Session<ManualEnv>, ManualEnv) {
        let env = ManualEnv::default();
        let session = Session::new(
            env.clone(),
            LocalIdentity::new("me", "Me"),
            SessionConfig::default(),
        );
        (session, env)
    }

    fn open_id(actions: &[SessionAction]) -> ConnectionId {
        actions
            .iter()
            .find_map(|a| match a {
                SessionAction::Transport(ConnectionAction::Open { id, .. }) => Some(*id),
                _ => None,
            })
            .unwrap()
    }

    fn frame(id: ConnectionId, text: &str) -> SessionEvent {
        SessionEvent::Transport(TransportEvent::Frame { id, text: text.to_string() })
    }

    fn paired() -> (Session<ManualEnv>, ManualEnv, ConnectionId) {
        let (mut session, env) = session();
        let actions =
            session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap();
        let id = open_id(&actions);
        session.handle(SessionEvent::Transport(TransportEvent::Opened { id })).unwrap();
        session
            .handle(frame(id, r#"{"type":"CONNECTED","connectedTo":{"username":"alice"}}"#))
            .unwrap();
        (session, env, id)
    }

    fn sent_frames(actions: &[SessionAction]) -> Vec<&str> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Transport(ConnectionAction::Send(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_search_opens_category_endpoint() {
        let (mut session, _) = session();
        let actions =
            session.handle(SessionEvent::StartSearch { category: Category::Movies }).unwrap();

        assert!(matches!(
            &actions[0],
            SessionAction::Transport(ConnectionAction::Open { endpoint, .. })
                if endpoint == "ws://localhost:8080/chat/movie"
        ));
        assert_eq!(actions[1], SessionAction::SearchStarted { category: Category::Movies });
        assert_eq!(session.state(), &PairingState::Searching { category: Category::Movies });
    }

    #[test]
    fn connected_with_null_username_pairs_anonymously() {
        let (mut session, _) = session();
        let id = open_id(
            &session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap(),
        );
        session.handle(SessionEvent::Transport(TransportEvent::Opened { id })).unwrap();

        session
            .handle(frame(id, r#"{"type":"CONNECTED","connectedTo":{"username":null}}"#))
            .unwrap();

        assert_eq!(session.state().phase(), PairingPhase::Paired);
        assert!(session.state().peer().is_some_and(PeerIdentity::is_anonymous));
    }

    #[test]
    fn start_search_twice_rejected() {
        let (mut session, _) = session();
        session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap();

        let result = session.handle(SessionEvent::StartSearch { category: Category::Albums });
        assert!(matches!(result, Err(SessionError::InvalidState { operation: "start search", .. })));
        assert_eq!(session.state(), &PairingState::Searching { category: Category::Artists });
    }

    #[test]
    fn peer_connected_pairs_with_empty_log() {
        let (session, _, _) = paired();

        assert_eq!(session.state().peer(), Some(&PeerIdentity::new("alice")));
        assert!(session.log().is_empty());
        assert!(session.connection().is_open());
    }

    #[test]
    fn cancel_while_searching_returns_to_idle() {
        let (mut session, _) = session();
        let id = open_id(
            &session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap(),
        );

        let actions = session.handle(SessionEvent::Cancel).unwrap();
        assert_eq!(actions, vec![
            SessionAction::Transport(ConnectionAction::Close { id }),
            SessionAction::Ended { reason: EndReason::Cancelled },
        ]);
        assert_eq!(session.state(), &PairingState::Idle);
        assert!(!session.connection().is_live());
    }

    #[test]
    fn leave_while_idle_is_noop() {
        let (mut session, _) = session();
        assert!(session.handle(SessionEvent::Cancel).unwrap().is_empty());
        assert!(session.handle(SessionEvent::Disconnect).unwrap().is_empty());
    }

    #[test]
    fn send_and_receive_share_one_sequence() {
        let (mut session, _, id) = paired();

        let actions = session.handle(SessionEvent::SendMessage { text: "hi".into() }).unwrap();
        assert_eq!(sent_frames(&actions), vec![r#"{"type":"MESSAGE","message":"hi","from":"me"}"#]);

        session.handle(frame(id, r#"{"type":"MESSAGE","message":"hello","from":"alice"}"#)).unwrap();

        let log = session.log().entries();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].sender_id.as_str(), log[0].text.as_str(), log[0].sequence), ("me", "hi", 0));
        assert_eq!(
            (log[1].sender_id.as_str(), log[1].text.as_str(), log[1].sequence),
            ("alice", "hello", 1)
        );
    }

    #[test]
    fn blank_message_rejected() {
        let (mut session, _, _) = paired();
        assert_eq!(
            session.handle(SessionEvent::SendMessage { text: "  \t".into() }),
            Err(SessionError::EmptyMessage)
        );
        assert!(session.log().is_empty());
    }

    #[test]
    fn send_outside_paired_rejected() {
        let (mut session, _) = session();
        assert_eq!(
            session.handle(SessionEvent::SendMessage { text: "hi".into() }),
            Err(SessionError::NotPaired)
        );
    }

    #[test]
    fn send_on_closed_transport_surfaces_error() {
        let (mut session, _) = session();
        session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap();
        // Any frame opens the transport, so pair directly on one still connecting
        session.state = PairingState::Paired { peer: PeerIdentity::new("alice") };

        assert_eq!(
            session.handle(SessionEvent::SendMessage { text: "hi".into() }),
            Err(SessionError::Connection(ConnectionError::NotOpen {
                state: ConnectionState::Connecting
            }))
        );
        assert!(session.log().is_empty());
    }

    #[test]
    fn messages_outside_paired_dropped() {
        let (mut session, _) = session();
        let id = open_id(
            &session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap(),
        );

        let actions =
            session.handle(frame(id, r#"{"type":"MESSAGE","message":"early","from":"x"}"#)).unwrap();
        assert!(actions.is_empty());
        let actions =
            session.handle(frame(id, r#"{"type":"STATE","typing":true,"from":"x"}"#)).unwrap();
        assert!(actions.is_empty());

        assert!(session.log().is_empty());
        assert!(!session.peer_typing());
    }

    #[test]
    fn malformed_frames_ignored() {
        let (mut session, _, id) = paired();
        assert!(session.handle(frame(id, "garbage")).unwrap().is_empty());
        assert!(session.handle(frame(id, r#"{"type":"PING"}"#)).unwrap().is_empty());
        assert!(session.state().is_paired());
    }

    #[test]
    fn peer_disconnect_tears_down() {
        let (mut session, _, id) = paired();
        session.handle(frame(id, r#"{"type":"MESSAGE","message":"hello","from":"alice"}"#)).unwrap();
        session.handle(frame(id, r#"{"type":"STATE","typing":true,"from":"alice"}"#)).unwrap();
        assert!(session.peer_typing());

        let actions =
            session.handle(frame(id, r#"{"type":"DISCONNECTED","reason":"peer left"}"#)).unwrap();

        assert_eq!(actions, vec![
            SessionAction::Transport(ConnectionAction::Close { id }),
            SessionAction::Ended { reason: EndReason::PeerLeft { reason: "peer left".into() } },
        ]);
        assert_eq!(session.state(), &PairingState::Idle);
        assert!(session.log().is_empty());
        assert!(!session.peer_typing());
        assert!(!session.connection().is_live());
    }

    #[test]
    fn frames_after_teardown_are_stale() {
        let (mut session, _, id) = paired();
        session.handle(frame(id, r#"{"type":"DISCONNECTED"}"#)).unwrap();

        let actions =
            session.handle(frame(id, r#"{"type":"MESSAGE","message":"late","from":"alice"}"#)).unwrap();
        assert!(actions.is_empty());
        assert!(session.log().is_empty());
    }

    #[test]
    fn transport_loss_returns_to_idle() {
        let (mut session, _, id) = paired();
        let actions = session
            .handle(SessionEvent::Transport(TransportEvent::Closed { id, reason: "reset".into() }))
            .unwrap();

        assert_eq!(actions, vec![SessionAction::Ended {
            reason: EndReason::TransportLost { reason: "reset".into() }
        }]);
        assert_eq!(session.state(), &PairingState::Idle);
    }

    #[test]
    fn typing_burst_sends_two_frames() {
        let (mut session, env, _) = paired();

        let mut sent = Vec::new();
        for _ in 0..20 {
            let actions = session.handle(SessionEvent::Typing).unwrap();
            sent.extend(sent_frames(&actions).into_iter().map(str::to_string));
            env.advance(100);
            let actions = session.handle(SessionEvent::Tick).unwrap();
            sent.extend(sent_frames(&actions).into_iter().map(str::to_string));
        }
        for _ in 0..10 {
            env.advance(100);
            let actions = session.handle(SessionEvent::Tick).unwrap();
            sent.extend(sent_frames(&actions).into_iter().map(str::to_string));
        }

        assert_eq!(sent, vec![
            r#"{"type":"STATE","typing":true,"from":"me"}"#.to_string(),
            r#"{"type":"STATE","typing":false,"from":"me"}"#.to_string(),
        ]);
    }

    #[test]
    fn next_deadline_tracks_quiet_interval() {
        let (mut session, env, _) = paired();
        assert_eq!(session.next_deadline(), None);

        session.handle(SessionEvent::Typing).unwrap();
        assert_eq!(session.next_deadline(), Some(Duration::from_millis(500)));

        env.advance(499);
        assert_eq!(session.next_deadline(), Some(Duration::from_millis(1)));
        assert!(sent_frames(&session.handle(SessionEvent::Tick).unwrap()).is_empty());

        env.advance(1);
        assert_eq!(session.next_deadline(), Some(Duration::ZERO));
        let actions = session.handle(SessionEvent::Tick).unwrap();
        assert_eq!(sent_frames(&actions), vec![r#"{"type":"STATE","typing":false,"from":"me"}"#]);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn typing_timer_cancelled_on_teardown() {
        let (mut session, env, _) = paired();
        session.handle(SessionEvent::Typing).unwrap();
        session.handle(SessionEvent::Disconnect).unwrap();

        env.advance(1000);
        assert!(session.handle(SessionEvent::Tick).unwrap().is_empty());
        assert!(!session.local_typing());
    }

    #[test]
    fn typing_ignored_outside_paired() {
        let (mut session, _) = session();
        assert!(session.handle(SessionEvent::Typing).unwrap().is_empty());
        assert!(!session.local_typing());
    }

    #[test]
    fn connect_then_disconnect_in_one_batch() {
        let (mut session, _) = session();
        let id = open_id(
            &session.handle(SessionEvent::StartSearch { category: Category::Artists }).unwrap(),
        );

        session.handle(frame(id, r#"{"type":"CONNECTED","connectedTo":{"username":"bob"}}"#)).unwrap();
        session.handle(frame(id, r#"{"type":"DISCONNECTED"}"#)).unwrap();

        assert_eq!(session.state(), &PairingState::Idle);
    }
}
