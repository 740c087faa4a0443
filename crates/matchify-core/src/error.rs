//! Error types for the Matchify core.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors that can occur during connection state machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Frame send attempted without an open transport.
    ///
    /// Nothing is buffered; the frame is gone.
    #[error("connection is not open (state: {state:?})")]
    NotOpen {
        /// State when the send was attempted
        state: ConnectionState,
    },
}

impl ConnectionError {
    /// Returns true if the transport was never opened or already torn down.
    pub fn is_not_open(&self) -> bool {
        matches!(self, Self::NotOpen { .. })
    }
}
