//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, time::Duration};

use matchify_client::{ConnectionId, TransportEvent};

use crate::{App, AppAction};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal and in simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, WebSocket transport
/// - **Simulation**: scripted input and transport events, virtual time
///
/// Transport events carry the [`ConnectionId`] passed to [`Driver::open`], so
/// a driver never has to filter out events from sockets it already closed.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event and feed it to `app`.
    ///
    /// Returns the resulting actions, empty if nothing happened. A driver that
    /// waits for input must return by `deadline` so the session can fire its
    /// timers on time.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn poll_event(
        &mut self,
        app: &mut App,
        deadline: Option<Duration>,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Open a socket to `endpoint`, replacing any previous one.
    ///
    /// Completion or failure is reported later as a [`TransportEvent`].
    fn open(&mut self, id: ConnectionId, endpoint: &str);

    /// Send a text frame on the current socket.
    ///
    /// # Errors
    ///
    /// Returns an error if no socket is open or the send fails.
    fn send_frame(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next transport event, or `None` if none is ready. Never blocks.
    fn recv_transport(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Close the socket opened as `id`.
    fn close(&mut self, id: ConnectionId);

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop all I/O and clean up resources.
    fn stop(&mut self);
}
