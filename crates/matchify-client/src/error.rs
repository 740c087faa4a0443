//! Session error types.

use matchify_core::ConnectionError;
use matchify_proto::ProtocolError;
use thiserror::Error;

use crate::PairingPhase;

/// Errors returned by [`crate::Session::handle`].
///
/// All of them are recoverable: the session state is unchanged when one is
/// returned, and the caller decides whether to show it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation is not valid in the current phase
    #[error("cannot {operation} while {phase}")]
    InvalidState {
        /// Phase when the operation was attempted
        phase: PairingPhase,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Chat message sent without a peer
    #[error("not paired with anyone")]
    NotPaired,

    /// Chat message is empty or whitespace
    #[error("message is empty")]
    EmptyMessage,

    /// Transport refused the frame
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Frame could not be encoded
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl SessionError {
    /// Returns true if the user should be told about this error.
    ///
    /// Empty messages are silently ignored, like the enter key on a blank
    /// input.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::EmptyMessage)
    }
}
