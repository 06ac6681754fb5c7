//! Student session tracking for EcoPulse.
//!
//! This crate owns the server-side record of every connected student:
//!
//! 1. **Session state** — which devices are on, since when, and which rule
//!    violations are currently flagged ([`StudentSession`], [`DeviceState`])
//! 2. **The store** — the mapping from connection identity to that record
//!    ([`SessionStore`])
//! 3. **Point awards** — the eco-point arithmetic that fires when a device
//!    goes off while a violation was flagged ([`PointsConfig`], [`PointAward`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server layer (above)  ← routes client events into the store
//!     ↕
//! Session layer (this crate)  ← per-student state and point awards
//!     ↕
//! Protocol layer (below)  ← provides SessionId, StudentSnapshot
//! ```

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{
    Device, DeviceState, PointAward, PointsConfig, StudentSession,
};
pub use store::SessionStore;
