//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use matchify_client::PairingPhase;

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// A peer is known exactly while paired.
///
/// Holds by construction in `PairingState`; checked here so a view that
/// copies the state wrongly is still caught.
pub struct PeerIffPaired;

impl Invariant for PeerIffPaired {
    fn kind(&self) -> InvariantKind {
        InvariantKind::PeerIffPaired
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (side, client) in state.clients() {
            let paired = client.phase == PairingPhase::Paired;
            if paired != client.peer.is_some() {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("{side}: phase {} with peer {:?}", client.phase, client.peer),
                });
            }
        }
        Ok(())
    }
}

/// Message sequences are `0, 1, 2, ...` in log order.
///
/// A gap or reordering means an entry was lost or delivered twice.
pub struct LogSequenceContiguous;

impl Invariant for LogSequenceContiguous {
    fn kind(&self) -> InvariantKind {
        InvariantKind::LogSequenceContiguous
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (side, client) in state.clients() {
            for (expected, entry) in (0u64..).zip(&client.messages) {
                if entry.sequence != expected {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!(
                            "{side}: entry {expected} has sequence {}",
                            entry.sequence
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Messages never outlive the chat they belong to.
pub struct NoMessagesOutsidePaired;

impl Invariant for NoMessagesOutsidePaired {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoMessagesOutsidePaired
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (side, client) in state.clients() {
            if client.phase != PairingPhase::Paired && !client.messages.is_empty() {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "{side}: {} messages while {}",
                        client.messages.len(),
                        client.phase
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The stranger cannot be typing when there is no stranger.
pub struct TypingClearedOutsidePaired;

impl Invariant for TypingClearedOutsidePaired {
    fn kind(&self) -> InvariantKind {
        InvariantKind::TypingClearedOutsidePaired
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (side, client) in state.clients() {
            if client.phase != PairingPhase::Paired && client.peer_typing {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("{side}: peer typing while {}", client.phase),
                });
            }
        }
        Ok(())
    }
}

/// What the user sees matches what the session holds.
///
/// Skipped when the snapshot has no session side.
pub struct ViewsAgree;

impl Invariant for ViewsAgree {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ViewsAgree
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(session) = &state.session else {
            return Ok(());
        };

        if state.view != *session {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("view {:?} != session {:?}", state.view, session),
            });
        }
        Ok(())
    }
}
