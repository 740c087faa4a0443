//! Matchify core state machines
//!
//! Pure building blocks of a pairing session. Nothing in this crate performs
//! I/O: every operation takes the current time (where it needs one) and
//! returns what the caller must do.
//!
//! # Components
//!
//! - [`Connection`]: Transport lifecycle (idle, connecting, open, closed)
//! - [`TypingDebouncer`]: Coalesces keystrokes into typing-state transitions
//! - [`MessageLog`]: Append-only ordered chat history
//! - [`Environment`]: Clock abstraction for real and virtual time

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;
pub mod log;
pub mod typing;

pub use connection::{Connection, ConnectionAction, ConnectionId, ConnectionState, TransportEvent};
pub use env::Environment;
pub use error::ConnectionError;
pub use log::{LogEntry, MessageLog};
pub use typing::{DEFAULT_QUIET_INTERVAL, TypingDebouncer, TypingSignal, TypingTransition};
