//! Matchify wire protocol
//!
//! Text frames exchanged over the pairing socket. Every frame is a JSON object
//! with a `type` discriminator; this crate turns those objects into closed sum
//! types ([`InboundEvent`], [`OutboundFrame`]) and back.
//!
//! The codec is pure and stateless: decoding the same text always yields the
//! same result, and nothing here knows which session a frame belongs to.
//!
//! # Components
//!
//! - [`InboundEvent`]: Server-to-client events (pairing, chat, typing)
//! - [`OutboundFrame`]: Client-to-server frames (chat, typing)
//! - [`Category`]: Matching categories and their endpoints
//! - [`ProtocolError`]: Decode and encode failures

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod category;
pub mod errors;
pub mod frame;

pub use category::Category;
pub use errors::{ProtocolError, Result};
pub use frame::{
    DEFAULT_DISCONNECT_REASON, FrameType, InboundEvent, OutboundFrame, PeerIdentity, SYSTEM_SENDER,
};
