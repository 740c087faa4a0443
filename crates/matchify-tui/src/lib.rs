//! Terminal UI for Matchify
//!
//! A thin shell over [`matchify_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`matchify_app::Runtime`].
//!
//! This crate only handles terminal rendering, the transport choice and the
//! simulated stranger used when no server is given.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod server;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use matchify_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use server::{StrangerServer, StrangerTiming};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError, Transport};
