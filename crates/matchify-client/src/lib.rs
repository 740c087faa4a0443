//! Client
//!
//! Action-based pairing session for Matchify. Drives one anonymous pairing
//! from search through chat to teardown.
//!
//! # Architecture
//!
//! The client follows the same Sans-IO and action-based patterns as
//! [`matchify_core`]. It receives events ([`SessionEvent`]), processes them
//! through pure state machine logic, and returns actions ([`SessionAction`])
//! for the caller to execute.
//!
//! # Components
//!
//! - [`Session`]: Pairing state machine (Idle, Searching, Paired)
//! - [`SessionEvent`]: Events fed into the session
//! - [`SessionAction`]: Actions produced by the session
//! - [`SessionConfig`]: Endpoint base and debounce interval
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::WsTransport`]: WebSocket transport driven by tokio

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod event;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use config::{DEFAULT_BASE_URL, LocalIdentity, SessionConfig};
pub use error::SessionError;
pub use event::{EndReason, PairingPhase, PairingState, SessionAction, SessionEvent, SessionSnapshot};
pub use matchify_core::{
    connection::{ConnectionAction, ConnectionId, TransportEvent},
    env::Environment,
    log::LogEntry,
};
pub use matchify_proto::{Category, PeerIdentity};
pub use session::Session;
