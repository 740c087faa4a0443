//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use matchify_app::App;
use matchify_client::{LogEntry, PairingPhase, SessionSnapshot};
use matchify_proto::PeerIdentity;

/// Snapshot of the entire system state.
///
/// Pairs what the user sees with what the session holds.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// What the App would render.
    pub view: ClientSnapshot,
    /// Session state. `None` when only the view is available.
    pub session: Option<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot of the view alone.
    pub fn from_app(app: &App) -> Self {
        Self { view: ClientSnapshot::from_app(app), session: None }
    }

    /// Snapshot of the view and the session behind it.
    pub fn from_parts(app: &App, session: &SessionSnapshot) -> Self {
        Self {
            view: ClientSnapshot::from_app(app),
            session: Some(ClientSnapshot::from_session(session)),
        }
    }

    /// Every client snapshot present.
    pub fn clients(&self) -> impl Iterator<Item = (&'static str, &ClientSnapshot)> {
        std::iter::once(("view", &self.view))
            .chain(self.session.as_ref().map(|s| ("session", s)))
    }
}

/// Observable state of one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    /// Pairing phase.
    pub phase: PairingPhase,
    /// Connected stranger.
    pub peer: Option<PeerIdentity>,
    /// Messages in order.
    pub messages: Vec<LogEntry>,
    /// Remote typing flag.
    pub peer_typing: bool,
}

impl Default for ClientSnapshot {
    fn default() -> Self {
        Self { phase: PairingPhase::Idle, peer: None, messages: Vec::new(), peer_typing: false }
    }
}

impl ClientSnapshot {
    /// Capture the App view.
    pub fn from_app(app: &App) -> Self {
        Self {
            phase: app.phase(),
            peer: app.peer().cloned(),
            messages: app.messages().to_vec(),
            peer_typing: app.peer_typing(),
        }
    }

    /// Capture the session.
    pub fn from_session(snapshot: &SessionSnapshot) -> Self {
        Self {
            phase: snapshot.state.phase(),
            peer: snapshot.state.peer().cloned(),
            messages: snapshot.messages.clone(),
            peer_typing: snapshot.peer_typing,
        }
    }
}
