//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`matchify_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Tests play the server: they inject transport events for the socket the
//! runtime opened and inspect the frames it sent.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use matchify_app::{App, AppAction, AppEvent, Driver, KeyInput};
use matchify_client::{ConnectionId, TransportEvent};
use matchify_proto::InboundEvent;

use crate::invariants::{InvariantRegistry, SystemSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    incoming: VecDeque<TransportEvent>,
    sent_frames: Vec<String>,
    opened: Vec<(ConnectionId, String)>,
    closed: Vec<ConnectionId>,
    socket: Option<ConnectionId>,
    auto_open: bool,
    renders: usize,
    stopped: bool,
    last_deadline: Option<Duration>,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`matchify_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<InvariantRegistry>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), invariants: None }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Report every opened socket as open right away.
    #[must_use]
    pub fn with_auto_open(self) -> Self {
        self.lock().auto_open = true;
        self
    }

    /// Second handle on the same queues, without invariant checking.
    ///
    /// Lets a test keep injecting and inspecting after the driver moved into
    /// a [`matchify_app::Runtime`].
    pub fn share(&self) -> Self {
        Self { state: Arc::clone(&self.state), invariants: None }
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a key press.
    pub fn inject_key(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject typed text, one key press per character.
    pub fn inject_text(&self, text: &str) {
        let mut state = self.lock();
        state.pending_events.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
    }

    /// Inject typed text followed by Enter.
    pub fn inject_line(&self, text: &str) {
        self.inject_text(text);
        self.inject_key(KeyInput::Enter);
    }

    /// Inject a tick event.
    pub fn inject_tick(&self) {
        self.inject_event(AppEvent::Tick);
    }

    /// Inject a raw transport event.
    pub fn inject_transport(&self, event: TransportEvent) {
        self.lock().incoming.push_back(event);
    }

    /// Report the current socket as open.
    ///
    /// Returns `false` if no socket is open.
    pub fn inject_opened(&self) -> bool {
        self.inject_for_socket(|id| TransportEvent::Opened { id })
    }

    /// Deliver a server frame on the current socket.
    ///
    /// Returns `false` if no socket is open.
    pub fn inject_frame(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.inject_for_socket(|id| TransportEvent::Frame { id, text })
    }

    /// Deliver an inbound event, encoded as the server would.
    ///
    /// Returns `false` if no socket is open or the event cannot be encoded.
    pub fn inject_server_event(&self, event: &InboundEvent) -> bool {
        match event.encode() {
            Ok(text) => self.inject_frame(text),
            Err(e) => {
                tracing::warn!(error = %e, "cannot encode injected event");
                false
            },
        }
    }

    /// Close the current socket from the server side.
    ///
    /// Returns `false` if no socket is open.
    pub fn inject_server_close(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        self.inject_for_socket(|id| TransportEvent::Closed { id, reason })
    }

    fn inject_for_socket(&self, event: impl FnOnce(ConnectionId) -> TransportEvent) -> bool {
        let mut state = self.lock();
        match state.socket {
            Some(id) => {
                state.incoming.push_back(event(id));
                true
            },
            None => false,
        }
    }

    /// Take all frames sent so far.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().sent_frames)
    }

    /// Every socket opened so far, with its endpoint.
    pub fn opened(&self) -> Vec<(ConnectionId, String)> {
        self.lock().opened.clone()
    }

    /// Every socket closed so far.
    pub fn closed(&self) -> Vec<ConnectionId> {
        self.lock().closed.clone()
    }

    /// Socket currently open, if any.
    pub fn socket(&self) -> Option<ConnectionId> {
        self.lock().socket
    }

    /// Number of renders performed.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// Deadline the runtime passed to the most recent poll.
    pub fn last_deadline(&self) -> Option<Duration> {
        self.lock().last_deadline
    }

    /// Whether [`Driver::stop`] was called.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        !state.pending_events.is_empty() || !state.incoming.is_empty()
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            registry.assert_all(&SystemSnapshot::from_app(app), context);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(
        &mut self,
        app: &mut App,
        deadline: Option<Duration>,
    ) -> Result<Vec<AppAction>, Self::Error> {
        let event = {
            let mut state = self.lock();
            state.last_deadline = deadline;
            state.pending_events.pop_front()
        };
        Ok(event.map(|event| app.handle(event)).unwrap_or_default())
    }

    fn open(&mut self, id: ConnectionId, endpoint: &str) {
        let mut state = self.lock();
        state.opened.push((id, endpoint.to_string()));
        state.socket = Some(id);
        if state.auto_open {
            state.incoming.push_back(TransportEvent::Opened { id });
        }
    }

    async fn send_frame(&mut self, text: String) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.socket.is_none() {
            return Err(SimDriverError("no open socket".to_string()));
        }
        state.sent_frames.push(text);
        Ok(())
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        self.lock().incoming.pop_front()
    }

    fn close(&mut self, id: ConnectionId) {
        let mut state = self.lock();
        state.closed.push(id);
        if state.socket == Some(id) {
            state.socket = None;
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.lock().renders += 1;
        self.check_invariants(app, "after render");
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.stopped = true;
        state.socket = None;
    }
}
