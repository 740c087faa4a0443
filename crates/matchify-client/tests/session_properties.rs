//! Property-based tests for the pairing session
//!
//! Feeds arbitrary interleavings of server frames and user intents into a
//! session and checks the log and teardown guarantees against a simple model.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use matchify_client::{
    Category, ConnectionAction, ConnectionId, Environment, LocalIdentity, PairingPhase, Session,
    SessionAction, SessionConfig, SessionEvent, TransportEvent,
};
use matchify_proto::{InboundEvent, PeerIdentity};
use proptest::prelude::*;

#[derive(Clone, Default)]
struct ManualEnv(Arc<AtomicU64>);

impl Environment for ManualEnv {
    type Instant = Duration;

    fn now(&self) -> Duration {
        Duration::from_millis(self.0.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
enum Step {
    Search,
    Cancel,
    Send(String),
    Type,
    Advance(u64),
    Inbound(InboundEvent),
    Garbage(String),
    TransportClosed,
}

fn arbitrary_inbound() -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        1 => "[a-z]{0,8}".prop_map(|name| InboundEvent::PeerConnected { peer: PeerIdentity::new(name) }),
        1 => "[a-z ]{0,12}".prop_map(|reason| InboundEvent::PeerDisconnected { reason }),
        3 => ("[a-z]{1,6}", "[ -~]{1,20}")
            .prop_map(|(sender_id, text)| InboundEvent::ChatMessage { sender_id, text }),
        1 => ("[a-z]{1,6}", any::<bool>())
            .prop_map(|(sender_id, is_typing)| InboundEvent::TypingState { sender_id, is_typing }),
    ]
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => Just(Step::Search),
        1 => Just(Step::Cancel),
        2 => "[ -~]{0,20}".prop_map(Step::Send),
        2 => Just(Step::Type),
        1 => (0u64..1000).prop_map(Step::Advance),
        6 => arbitrary_inbound().prop_map(Step::Inbound),
        1 => ".{0,20}".prop_map(Step::Garbage),
        1 => Just(Step::TransportClosed),
    ]
}

/// Runs steps and tracks the model of what the log must contain.
struct Harness {
    session: Session<ManualEnv>,
    env: ManualEnv,
    current: Option<ConnectionId>,
    expected_log: Vec<(String, String)>,
    typing_frames: Vec<bool>,
}

impl Harness {
    fn new() -> Self {
        let env = ManualEnv::default();
        let session =
            Session::new(env.clone(), LocalIdentity::new("me", "Me"), SessionConfig::default());
        Self { session, env, current: None, expected_log: Vec::new(), typing_frames: Vec::new() }
    }

    fn feed(&mut self, event: SessionEvent) {
        let Ok(actions) = self.session.handle(event) else {
            return;
        };

        for action in actions {
            match action {
                SessionAction::Transport(ConnectionAction::Open { id, .. }) => {
                    self.current = Some(id);
                    // Open immediately so sends are possible
                    let _ = self.session.handle(SessionEvent::Transport(TransportEvent::Opened { id }));
                },
                SessionAction::Transport(ConnectionAction::Close { .. }) => self.current = None,
                SessionAction::Transport(ConnectionAction::Send(text)) => {
                    if text.contains(r#""type":"STATE""#) {
                        self.typing_frames.push(text.contains(r#""typing":true"#));
                    }
                },
                SessionAction::Ended { .. } => {
                    self.current = None;
                    self.expected_log.clear();
                },
                SessionAction::PeerConnected { .. } => self.expected_log.clear(),
                SessionAction::SearchStarted { .. }
                | SessionAction::MessageAppended(_)
                | SessionAction::PeerTyping { .. } => {},
            }
        }
    }

    fn step(&mut self, step: Step) {
        let paired = self.session.state().phase() == PairingPhase::Paired;
        match step {
            Step::Search => self.feed(SessionEvent::StartSearch { category: Category::Artists }),
            Step::Cancel => self.feed(SessionEvent::Cancel),
            Step::Send(text) => {
                if paired && !text.trim().is_empty() {
                    self.expected_log.push(("me".to_string(), text.clone()));
                }
                self.feed(SessionEvent::SendMessage { text });
            },
            Step::Type => self.feed(SessionEvent::Typing),
            Step::Advance(ms) => {
                self.env.0.fetch_add(ms, Ordering::SeqCst);
                self.feed(SessionEvent::Tick);
            },
            Step::Inbound(event) => {
                let Some(id) = self.current else { return };
                if paired && let InboundEvent::ChatMessage { sender_id, text } = &event {
                    self.expected_log.push((sender_id.clone(), text.clone()));
                }
                let text = event.encode().unwrap();
                self.feed(SessionEvent::Transport(TransportEvent::Frame { id, text }));
            },
            Step::Garbage(text) => {
                let Some(id) = self.current else { return };
                if InboundEvent::decode(&text).is_ok() {
                    return;
                }
                self.feed(SessionEvent::Transport(TransportEvent::Frame { id, text }));
            },
            Step::TransportClosed => {
                let Some(id) = self.current else { return };
                self.feed(SessionEvent::Transport(TransportEvent::Closed {
                    id,
                    reason: "reset".to_string(),
                }));
            },
        }
    }
}

proptest! {
    #[test]
    fn prop_log_matches_paired_chat_order(steps in prop::collection::vec(arbitrary_step(), 0..80)) {
        let mut h = Harness::new();

        for step in steps {
            h.step(step);

            let log: Vec<(String, String)> = h
                .session
                .log()
                .entries()
                .iter()
                .map(|e| (e.sender_id.clone(), e.text.clone()))
                .collect();
            prop_assert_eq!(&log, &h.expected_log);

            for (i, entry) in h.session.log().entries().iter().enumerate() {
                prop_assert_eq!(entry.sequence, i as u64);
            }
        }
    }

    #[test]
    fn prop_state_invariants_hold(steps in prop::collection::vec(arbitrary_step(), 0..80)) {
        let mut h = Harness::new();

        for step in steps {
            h.step(step);
            let snapshot = h.session.snapshot();
            let paired = snapshot.state.phase() == PairingPhase::Paired;

            prop_assert_eq!(snapshot.state.peer().is_some(), paired);
            if !paired {
                prop_assert!(snapshot.messages.is_empty());
                prop_assert!(!snapshot.peer_typing);
                prop_assert!(!snapshot.local_typing);
            }
            if snapshot.state.phase() == PairingPhase::Idle {
                prop_assert!(!h.session.connection().is_live());
            }
        }
    }

    #[test]
    fn prop_typing_frames_alternate(steps in prop::collection::vec(arbitrary_step(), 0..80)) {
        let mut h = Harness::new();
        let mut last_typing = false;
        let mut seen = 0;

        for step in steps {
            let phase_before = h.session.state().phase();
            h.step(step);
            if h.session.state().phase() != PairingPhase::Paired || phase_before != PairingPhase::Paired {
                // Teardown cancels the burst without a closing frame
                last_typing = false;
                seen = h.typing_frames.len();
                continue;
            }
            for typing in &h.typing_frames[seen..] {
                prop_assert_ne!(*typing, last_typing);
                last_typing = *typing;
            }
            seen = h.typing_frames.len();
        }
    }

    #[test]
    fn prop_disconnect_always_wins(
        before in prop::collection::vec(arbitrary_inbound(), 0..10),
    ) {
        let mut h = Harness::new();
        h.step(Step::Search);
        h.step(Step::Inbound(InboundEvent::PeerConnected { peer: PeerIdentity::new("alice") }));

        for event in before {
            h.step(Step::Inbound(event));
        }
        h.step(Step::Inbound(InboundEvent::PeerDisconnected { reason: "peer left".to_string() }));

        prop_assert_eq!(h.session.state().phase(), PairingPhase::Idle);
        prop_assert!(h.session.log().is_empty());
        prop_assert!(!h.session.peer_typing());
    }
}
