//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The network side is either a
//! real WebSocket or the in-process simulated stranger.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use matchify_app::{App, AppAction, AppEvent, Driver, KeyInput};
use matchify_client::{
    ConnectionId, TransportEvent,
    transport::{TransportError, WsTransport},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::{server::StrangerServer, ui};

/// How often the runtime gets a tick when nothing else happens.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No conversation is open.
    #[error("not connected")]
    NotConnected,

    /// Channel send error.
    #[error("channel send error")]
    ChannelSend,
}

/// Where frames go.
pub enum Transport {
    /// Real matching server.
    WebSocket(WsTransport),
    /// In-process simulated stranger.
    Simulated(StrangerServer),
}

impl Transport {
    fn open(&mut self, id: ConnectionId, endpoint: &str) {
        match self {
            Self::WebSocket(t) => t.open(id, endpoint),
            Self::Simulated(s) => s.open(id, endpoint),
        }
    }

    fn send(&self, text: String) -> Result<(), TerminalError> {
        match self {
            Self::WebSocket(t) => Ok(t.send(text)?),
            Self::Simulated(s) => s.send(text),
        }
    }

    fn close(&mut self) {
        match self {
            Self::WebSocket(t) => t.close(),
            Self::Simulated(s) => s.close(),
        }
    }

    fn try_recv(&mut self) -> Option<TransportEvent> {
        match self {
            Self::WebSocket(t) => t.try_recv(),
            Self::Simulated(s) => s.try_recv(),
        }
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        match self {
            Self::WebSocket(t) => t.recv().await,
            Self::Simulated(s) => s.recv().await,
        }
    }
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the transport.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    transport: Transport,
    /// Socket the session currently owns
    socket: Option<ConnectionId>,
    /// Transport events that woke `poll_event`
    ready: VecDeque<TransportEvent>,
}

impl TerminalDriver {
    /// Create a new terminal driver and switch the terminal to raw mode.
    pub fn new(transport: Transport) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, transport, socket: None, ready: VecDeque::new() })
    }

    /// How long to wait for input before ticking.
    fn tick_timeout(deadline: Option<Duration>) -> Duration {
        deadline.map_or(TICK_INTERVAL, |deadline| deadline.min(TICK_INTERVAL))
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(
        &mut self,
        app: &mut App,
        deadline: Option<Duration>,
    ) -> Result<Vec<AppAction>, Self::Error> {
        let timeout = Self::tick_timeout(deadline);
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        match Self::convert_key(key_event.code) {
                            Some(key_input) => Ok(app.handle(AppEvent::Key(key_input))),
                            None => Ok(vec![]),
                        }
                    },
                    Some(Ok(Event::Resize(cols, rows))) => {
                        Ok(app.handle(AppEvent::Resize(cols, rows)))
                    },
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(vec![]),
                }
            }

            // Wake up as soon as the network has something
            Some(event) = self.transport.recv() => {
                self.ready.push_back(event);
                Ok(vec![])
            }

            // Tick when idle or when a session timer is due
            () = tokio::time::sleep(timeout) => {
                Ok(app.handle(AppEvent::Tick))
            }
        }
    }

    fn open(&mut self, id: ConnectionId, endpoint: &str) {
        self.transport.open(id, endpoint);
        self.socket = Some(id);
    }

    async fn send_frame(&mut self, text: String) -> Result<(), Self::Error> {
        self.transport.send(text)
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        self.ready.pop_front().or_else(|| self.transport.try_recv())
    }

    fn close(&mut self, id: ConnectionId) {
        if self.socket == Some(id) {
            self.transport.close();
            self.socket = None;
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.transport.close();
        self.socket = None;
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
