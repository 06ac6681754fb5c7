//! Core protocol types for EcoPulse's wire format.
//!
//! Every type in this module travels on the wire: it gets serialized to
//! JSON, sent over the WebSocket, and deserialized on the other side.
//!
//! The surface is a set of named events in both directions, tagged with an
//! `"event"` field and camelCase field names, so a plain-JavaScript
//! dashboard client can speak the protocol without a generated SDK:
//!
//! ```json
//! { "event": "chargerToggle", "chargerOn": true }
//! ```

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a connected client's session.
///
/// Newtype over `u64` so a session id can't be confused with any other
/// counter. Assigned by the transport when a connection is accepted and
/// echoed back to the client in the login ack.
///
/// `#[serde(transparent)]` serializes this as a plain number, so
/// `SessionId(42)` becomes `42` in JSON, not `{ "0": 42 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Rule violations
// ---------------------------------------------------------------------------

/// The two rule breaches the server knows about.
///
/// - `ChargerDuration` — the charger stayed on past the allowed duration.
/// - `LightsDaytime` — the lights are on during restricted daytime hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    ChargerDuration,
    LightsDaytime,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChargerDuration => write!(f, "chargerDuration"),
            Self::LightsDaytime => write!(f, "lightsDaytime"),
        }
    }
}

/// Category of an outbound [`ServerEvent::Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// A device was toggled on or off.
    Device,
    /// The server-side rule scanner flagged a violation.
    Alert,
}

// ---------------------------------------------------------------------------
// Campus metrics
// ---------------------------------------------------------------------------

/// One simulated reading of campus-wide sustainability metrics.
///
/// Broadcast periodically to every connected client. The bounds are
/// documented (and enforced) by the simulator that produces these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusReading {
    /// Campus energy usage in kWh (2000–7000).
    pub energy_usage: u32,
    /// Solar generation in kWh (1000–4000).
    pub solar_generation: u32,
    /// Waste container fill level in percent (20–100).
    pub waste_level: u32,
    /// Composite carbon score (60–100, higher is better).
    pub carbon_score: u32,
}

// ---------------------------------------------------------------------------
// Student snapshot
// ---------------------------------------------------------------------------

/// A full snapshot of one student's server-side state.
///
/// Sent as `studentStateUpdate` after every device toggle so the client can
/// render from the server's authoritative view instead of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSnapshot {
    /// The username the student logged in with.
    pub user_id: String,
    /// Whether the charger is currently on.
    pub charger_on: bool,
    /// Whether the lights are currently on.
    pub lights_on: bool,
    /// Whether the charger-duration rule is currently flagged.
    pub charger_duration_violation: bool,
    /// Whether the lights-daytime rule is currently flagged.
    pub lights_daytime_violation: bool,
    /// Lifetime eco points.
    pub eco_points_total: u32,
    /// Eco points earned today.
    pub eco_points_today: u32,
    /// RFC 3339 timestamp of when the session was created.
    pub connected_at: String,
}

// ---------------------------------------------------------------------------
// Client → server events
// ---------------------------------------------------------------------------

/// Events a dashboard client sends to the server.
///
/// `#[serde(tag = "event")]` produces internally tagged JSON — the variant
/// name rides in an `"event"` field next to the payload:
///
/// ```json
/// { "event": "studentLogin", "username": "ada", "userRole": "student" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// "I'm a student, start tracking me." Non-student roles are logged
    /// and ignored — no session is created for them.
    StudentLogin { username: String, user_role: String },

    /// The student toggled their charger.
    ChargerToggle { charger_on: bool },

    /// The student toggled their lights.
    LightsToggle { lights_on: bool },

    /// Client-side rule detection: the client noticed (or resolved) a
    /// violation and is telling the server about it.
    RuleViolation {
        kind: ViolationKind,
        triggered: bool,
    },

    /// Explicit goodbye. Closing the socket has the same effect.
    Disconnect,
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// Events the server sends to dashboard clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// "You're logged in; here's your session id."
    StudentLoginAck {
        session_id: SessionId,
        message: String,
    },

    /// Periodic campus metrics broadcast (goes to ALL clients).
    CampusData(CampusReading),

    /// Authoritative snapshot of the student's state after a toggle.
    StudentStateUpdate(StudentSnapshot),

    /// A human-readable notification for the activity feed.
    Notification {
        kind: NotificationKind,
        message: String,
        /// RFC 3339 timestamp of when the notification was generated.
        timestamp: String,
    },

    /// Eco points were just awarded.
    EcoPointsUpdate {
        points_awarded: u32,
        total_points: u32,
        today_points: u32,
        message: String,
    },

    /// Acknowledges a client-reported rule violation.
    RuleViolationAck {
        kind: ViolationKind,
        triggered: bool,
    },
}

// =========================================================================
// Tests
// =========================================================================
