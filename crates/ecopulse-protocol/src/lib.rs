//! Wire protocol for EcoPulse.
//!
//! This crate defines the "language" that dashboard clients and the server
//! speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`CampusReading`], etc.) —
//!   the named events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (student state). It doesn't know about connections or timers — it only
//! knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Session (student state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CampusReading, ClientEvent, NotificationKind, ServerEvent, SessionId,
    StudentSnapshot, ViolationKind,
};
