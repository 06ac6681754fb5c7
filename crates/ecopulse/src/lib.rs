//! EcoPulse: a classroom campus-sustainability dashboard server.
//!
//! The server broadcasts simulated campus metrics to every connected
//! dashboard, tracks each student's device state (charger, lights), flags
//! rule violations, and awards eco points when a student corrects a
//! flagged violation in time.
//!
//! This meta-crate ties the layers together:
//!
//! - [`ecopulse_transport`]: WebSocket accept loop and connections
//! - [`ecopulse_protocol`]: wire events and the JSON codec
//! - [`ecopulse_session`]: per-student state and point awards
//! - [`ecopulse_rules`]: the server-side violation scanner
//! - [`ecopulse_sim`]: the campus metrics generator
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ecopulse::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EcoPulseError> {
//!     let server = EcoPulseServerBuilder::new()
//!         .bind("127.0.0.1:5000")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod registry;
mod server;

pub use error::EcoPulseError;
pub use server::{EcoPulseServer, EcoPulseServerBuilder};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{EcoPulseError, EcoPulseServer, EcoPulseServerBuilder};

    pub use ecopulse_protocol::{
        CampusReading, ClientEvent, Codec, JsonCodec, NotificationKind,
        ServerEvent, SessionId, StudentSnapshot, ViolationKind,
    };
    pub use ecopulse_rules::{RuleConfig, RuleEngine};
    pub use ecopulse_session::{
        Device, PointAward, PointsConfig, SessionStore, StudentSession,
    };
    pub use ecopulse_sim::CampusSimulator;
}
