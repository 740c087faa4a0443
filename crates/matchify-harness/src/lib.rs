//! Deterministic simulation harness for Matchify session testing.
//!
//! Virtual-time [`SimEnv`] and a scripted [`SimDriver`] let the production
//! [`matchify_app::Runtime`] run under test without sockets, terminals or
//! sleeping.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! App/Session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ClientSnapshot, Invariant, InvariantKind, InvariantRegistry, InvariantResult,
    LogSequenceContiguous, NoMessagesOutsidePaired, PeerIffPaired, SystemSnapshot,
    TypingClearedOutsidePaired, ViewsAgree, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::SimEnv;
