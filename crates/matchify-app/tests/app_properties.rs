//! Property-based tests for the App and Bridge together.
//!
//! Tests verify that invariants hold under arbitrary interleavings of key
//! presses, server frames, socket loss and time. The test plays the server
//! for whichever socket the session currently has open.

use std::time::Duration;

use matchify_app::{App, AppAction, AppEvent, Bridge, KeyInput};
use matchify_client::{
    ConnectionAction, ConnectionId, LocalIdentity, PairingPhase, PeerIdentity, SessionConfig,
    TransportEvent,
};
use matchify_harness::{InvariantRegistry, SimEnv, SystemSnapshot};
use matchify_proto::InboundEvent;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Key(KeyInput),
    Line(&'static str),
    Server(InboundEvent),
    SocketLost,
    Advance(u64),
}

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => prop::sample::select(vec!['a', 'z', ' ', '/', 'é']).prop_map(KeyInput::Char),
        2 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Tab),
        1 => Just(KeyInput::Esc),
    ]
}

fn server_strategy() -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        3 => prop::sample::select(vec!["alice", "bob", ""])
            .prop_map(|name| InboundEvent::PeerConnected { peer: PeerIdentity::new(name) }),
        4 => "[a-z ]{1,12}".prop_map(|text| InboundEvent::ChatMessage {
            sender_id: "peer".into(),
            text,
        }),
        2 => any::<bool>().prop_map(|is_typing| InboundEvent::TypingState {
            sender_id: "peer".into(),
            is_typing,
        }),
        1 => Just(InboundEvent::PeerDisconnected { reason: "peer left".into() }),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => key_strategy().prop_map(Step::Key),
        3 => prop::sample::select(vec!["/find", "/find movies", "/cancel", "/leave", "hello", "//x", "   "])
            .prop_map(Step::Line),
        6 => server_strategy().prop_map(Step::Server),
        1 => Just(Step::SocketLost),
        2 => (0u64..800).prop_map(Step::Advance),
    ]
}

/// App, Bridge and a fake server socket.
struct World {
    app: App,
    bridge: Bridge<SimEnv>,
    env: SimEnv,
    socket: Option<ConnectionId>,
    sent: Vec<String>,
}

impl World {
    fn new() -> Self {
        let env = SimEnv::new();
        let identity = LocalIdentity::new("me", "Me");
        Self {
            app: App::new(identity.clone()),
            bridge: Bridge::new(env.clone(), identity, SessionConfig::default()),
            env,
            socket: None,
            sent: Vec::new(),
        }
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Key(key) => {
                let actions = self.app.handle(AppEvent::Key(key));
                self.run_actions(actions);
            },
            Step::Line(line) => {
                for c in line.chars() {
                    let actions = self.app.handle(AppEvent::Key(KeyInput::Char(c)));
                    self.run_actions(actions);
                }
                let actions = self.app.handle(AppEvent::Key(KeyInput::Enter));
                self.run_actions(actions);
            },
            Step::Server(event) => {
                if let Some(id) = self.socket {
                    let text = event.encode().unwrap();
                    let events = self.bridge.handle_transport(TransportEvent::Frame { id, text });
                    self.deliver(events);
                }
            },
            Step::SocketLost => {
                if let Some(id) = self.socket.take() {
                    let reason = "reset".to_string();
                    let events = self.bridge.handle_transport(TransportEvent::Closed { id, reason });
                    self.deliver(events);
                }
            },
            Step::Advance(ms) => {
                self.env.advance(Duration::from_millis(ms));
                let events = self.bridge.handle_tick();
                self.deliver(events);
            },
        }
    }

    fn run_actions(&mut self, initial: Vec<AppAction>) {
        let mut pending = initial;
        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                match action {
                    AppAction::Render | AppAction::Quit => {},
                    other => {
                        let events = self.bridge.process_app_action(other);
                        self.flush();
                        for event in events {
                            pending.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
    }

    fn deliver(&mut self, events: Vec<AppEvent>) {
        self.flush();
        for event in events {
            let actions = self.app.handle(event);
            self.run_actions(actions);
        }
    }

    fn flush(&mut self) {
        for action in self.bridge.take_outgoing() {
            match action {
                ConnectionAction::Open { id, .. } => {
                    self.socket = Some(id);
                    let events = self.bridge.handle_transport(TransportEvent::Opened { id });
                    assert!(events.is_empty());
                },
                ConnectionAction::Send(text) => self.sent.push(text),
                ConnectionAction::Close { id } => {
                    if self.socket == Some(id) {
                        self.socket = None;
                    }
                },
            }
        }
    }

    fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot::from_parts(&self.app, &self.bridge.session().snapshot())
    }
}

proptest! {
    #[test]
    fn invariants_hold_for_any_interleaving(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let registry = InvariantRegistry::standard();
        let mut world = World::new();

        for (i, step) in steps.into_iter().enumerate() {
            world.apply(step);
            registry.assert_all(&world.snapshot(), &format!("after step {i}"));
        }
    }

    #[test]
    fn socket_open_iff_not_idle(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let mut world = World::new();

        for step in steps {
            world.apply(step);
            let idle = world.app.phase() == PairingPhase::Idle;
            prop_assert_eq!(world.socket.is_none(), idle);
        }
    }

    #[test]
    fn sends_only_while_paired(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let mut world = World::new();

        for step in steps {
            let was_paired = world.app.is_connected();
            let before = world.sent.len();
            world.apply(step);
            if world.sent.len() > before {
                prop_assert!(was_paired);
            }
        }
    }
}
