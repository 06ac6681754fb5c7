//! Session types: the data structures that represent a student's state.
//!
//! A "session" is the server's record of one connected student. It tracks:
//! - WHO the student is (their login username)
//! - WHAT their devices are doing (on/off, since when)
//! - WHICH rules they are currently breaking (violation flags)
//! - HOW MANY eco points they have earned (lifetime and today)

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ecopulse_protocol::{StudentSnapshot, ViolationKind};

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// The two simulated devices each student controls.
///
/// Each device has its own rule: the charger may not stay on past a
/// duration limit, the lights may not be on during daytime hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Charger,
    Lights,
}

impl Device {
    /// The rule violation that applies to this device.
    pub fn violation_kind(self) -> ViolationKind {
        match self {
            Self::Charger => ViolationKind::ChargerDuration,
            Self::Lights => ViolationKind::LightsDaytime,
        }
    }
}

/// Each violation kind targets exactly one device, so the mapping goes
/// both ways.
impl From<ViolationKind> for Device {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::ChargerDuration => Self::Charger,
            ViolationKind::LightsDaytime => Self::Lights,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Charger => write!(f, "charger"),
            Self::Lights => write!(f, "lights"),
        }
    }
}

// ---------------------------------------------------------------------------
// DeviceState
// ---------------------------------------------------------------------------

/// The tracked state of one device.
///
/// Invariant: `turned_on_at` is `Some` iff `on` is `true`. Turning the
/// device on stamps the timestamp; turning it off clears it.
///
/// `Instant` is the monotonic clock — it always moves forward and isn't
/// affected by system clock changes, which is what elapsed-time rules need.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    /// Whether the device is currently on.
    pub on: bool,

    /// When the device was last turned on. `Some` iff `on`.
    pub turned_on_at: Option<Instant>,

    /// Whether this device's rule violation is currently flagged.
    pub violation: bool,

    /// When the violation was last flagged. Stamped on every trigger,
    /// read by the point-award computation.
    pub violation_at: Option<Instant>,
}

// ---------------------------------------------------------------------------
// PointsConfig / PointAward
// ---------------------------------------------------------------------------

/// Configuration for the eco-point award rule.
///
/// The defaults reproduce the classroom rules: +10 for correcting a flagged
/// violation within two minutes, +5 for correcting it later. Tests override
/// the window instead of sleeping through it.
#[derive(Debug, Clone)]
pub struct PointsConfig {
    /// How long (in seconds) after a violation is flagged the correction
    /// still counts as "quick". Default: 120 seconds.
    pub quick_window_secs: u64,

    /// Points awarded for a quick correction. Default: 10.
    pub quick_points: u32,

    /// Points awarded for a late correction. Default: 5.
    pub base_points: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            quick_window_secs: 120,
            quick_points: 10,
            base_points: 5,
        }
    }
}

impl PointsConfig {
    /// The quick-correction window as a `Duration`.
    pub fn quick_window(&self) -> Duration {
        Duration::from_secs(self.quick_window_secs)
    }
}

/// The outcome of a point award: how much was earned and the new totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointAward {
    /// Points awarded by this correction.
    pub points: u32,
    /// Whether the correction landed inside the quick window.
    pub quick: bool,
    /// New lifetime total.
    pub total: u32,
    /// New total for today.
    pub today: u32,
}

// ---------------------------------------------------------------------------
// StudentSession
// ---------------------------------------------------------------------------

/// One student's session on the server.
///
/// Created at login, mutated by toggle/violation events and the periodic
/// rule scanner, removed at disconnect. There are no cross-session
/// relationships — each record stands alone.
#[derive(Debug, Clone)]
pub struct StudentSession {
    /// The username the student logged in with.
    pub user_id: String,

    /// Charger state and its duration-rule bookkeeping.
    pub charger: DeviceState,

    /// Lights state and its daytime-rule bookkeeping.
    pub lights: DeviceState,

    /// Lifetime eco points.
    pub points_total: u32,

    /// Eco points earned today.
    pub points_today: u32,

    /// Wall-clock time the session was created (reported to the client).
    pub connected_at: DateTime<Utc>,
}

impl StudentSession {
    /// Creates a fresh session for the given user.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            charger: DeviceState::default(),
            lights: DeviceState::default(),
            points_total: 0,
            points_today: 0,
            connected_at: Utc::now(),
        }
    }

    /// Borrows the state of one device.
    pub fn device(&self, device: Device) -> &DeviceState {
        match device {
            Device::Charger => &self.charger,
            Device::Lights => &self.lights,
        }
    }

    /// Mutably borrows the state of one device.
    pub fn device_mut(&mut self, device: Device) -> &mut DeviceState {
        match device {
            Device::Charger => &mut self.charger,
            Device::Lights => &mut self.lights,
        }
    }

    /// Builds the wire snapshot sent to the client after every toggle.
    pub fn snapshot(&self) -> StudentSnapshot {
        StudentSnapshot {
            user_id: self.user_id.clone(),
            charger_on: self.charger.on,
            lights_on: self.lights.on,
            charger_duration_violation: self.charger.violation,
            lights_daytime_violation: self.lights.violation,
            eco_points_total: self.points_total,
            eco_points_today: self.points_today,
            connected_at: self.connected_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_clean() {
        let session = StudentSession::new("ada");
        assert_eq!(session.user_id, "ada");
        assert!(!session.charger.on);
        assert!(!session.lights.on);
        assert!(session.charger.turned_on_at.is_none());
        assert!(session.lights.turned_on_at.is_none());
        assert_eq!(session.points_total, 0);
        assert_eq!(session.points_today, 0);
    }

    #[test]
    fn test_device_violation_kind_mapping_round_trips() {
        for device in [Device::Charger, Device::Lights] {
            assert_eq!(Device::from(device.violation_kind()), device);
        }
    }

    #[test]
    fn test_snapshot_reflects_session_fields() {
        let mut session = StudentSession::new("grace");
        session.charger.on = true;
        session.charger.turned_on_at = Some(std::time::Instant::now());
        session.lights.violation = true;
        session.points_total = 15;
        session.points_today = 5;

        let snap = session.snapshot();
        assert_eq!(snap.user_id, "grace");
        assert!(snap.charger_on);
        assert!(!snap.lights_on);
        assert!(!snap.charger_duration_violation);
        assert!(snap.lights_daytime_violation);
        assert_eq!(snap.eco_points_total, 15);
        assert_eq!(snap.eco_points_today, 5);
        assert_eq!(snap.connected_at, session.connected_at.to_rfc3339());
    }

    #[test]
    fn test_points_config_defaults_match_classroom_rules() {
        let config = PointsConfig::default();
        assert_eq!(config.quick_window(), Duration::from_secs(120));
        assert_eq!(config.quick_points, 10);
        assert_eq!(config.base_points, 5);
    }
}
