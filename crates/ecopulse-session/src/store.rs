//! The session store: tracks every connected student's state.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Creating a record at login
//! - Applying device toggles (and computing point awards on the off edge)
//! - Applying client-reported violation triggers/resolutions
//! - Removing the record at disconnect
//!
//! # Concurrency note
//!
//! `SessionStore` is NOT thread-safe by itself — it uses a plain `HashMap`,
//! not a concurrent one. This is intentional: the store is owned by the
//! server state and accessed through a mutex at a higher level. Keeping it
//! simple here avoids hidden locking overhead and keeps every operation
//! directly unit-testable.

use std::collections::HashMap;
use std::time::Instant;

use ecopulse_protocol::{SessionId, StudentSnapshot, ViolationKind};

use crate::{
    Device, PointAward, PointsConfig, SessionError, StudentSession,
};

/// Maps connection identity to the student's mutable record.
///
/// ## Lifecycle
///
/// ```text
/// login() ──→ set_device() / report_violation() / scanner ──→ remove()
///                │
///                ▼ (device off while violation flagged)
///           PointAward
/// ```
pub struct SessionStore {
    /// All live sessions, keyed by the connection's session id.
    sessions: HashMap<SessionId, StudentSession>,

    /// Point-award parameters (quick window, point values).
    config: PointsConfig,
}

impl SessionStore {
    /// Creates a new, empty store with the given award configuration.
    pub fn new(config: PointsConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Creates a session record at login.
    ///
    /// A re-login on the same connection replaces the old record — device
    /// state and point totals start over.
    pub fn login(
        &mut self,
        id: SessionId,
        user_id: &str,
    ) -> &StudentSession {
        if self.sessions.contains_key(&id) {
            tracing::info!(%id, user_id, "re-login replaces existing session");
        } else {
            tracing::info!(%id, user_id, "session created");
        }
        self.sessions.insert(id, StudentSession::new(user_id));
        // Just inserted, so the lookup cannot miss.
        self.sessions.get(&id).expect("just inserted")
    }

    /// Applies a device toggle.
    ///
    /// Turning a device **on** stamps its `turned_on_at` timestamp.
    /// Turning it **off** clears the on/timestamp fields and, if the
    /// device's violation flag was set, computes the point award from the
    /// elapsed time since the violation was flagged: `quick_points` inside
    /// the quick window, `base_points` after it. The violation flag itself
    /// is left for the resolve path to clear.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn set_device(
        &mut self,
        id: SessionId,
        device: Device,
        on: bool,
    ) -> Result<Option<PointAward>, SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;

        let (was_violating, violation_at) = {
            let state = session.device_mut(device);
            state.on = on;
            if on {
                state.turned_on_at = Some(Instant::now());
                tracing::info!(
                    %id, user_id = %session.user_id, %device,
                    "device turned on"
                );
                return Ok(None);
            }
            let was_violating = state.violation;
            state.turned_on_at = None;
            (was_violating, state.violation_at)
        };

        tracing::info!(
            %id, user_id = %session.user_id, %device,
            "device turned off"
        );

        if !was_violating {
            return Ok(None);
        }
        let Some(flagged_at) = violation_at else {
            return Ok(None);
        };

        let elapsed = flagged_at.elapsed();
        let quick = elapsed <= self.config.quick_window();
        let points = if quick {
            self.config.quick_points
        } else {
            self.config.base_points
        };

        session.points_total += points;
        session.points_today += points;

        tracing::info!(
            %id,
            user_id = %session.user_id,
            %device,
            points,
            quick,
            total = session.points_total,
            "eco points awarded for correcting a violation"
        );

        Ok(Some(PointAward {
            points,
            quick,
            total: session.points_total,
            today: session.points_today,
        }))
    }

    /// Applies a client-reported violation trigger or resolution.
    ///
    /// Triggering sets the device's violation flag and stamps
    /// `violation_at`; resolving only clears the flag, leaving the last
    /// stamp in place.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn report_violation(
        &mut self,
        id: SessionId,
        kind: ViolationKind,
        triggered: bool,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;

        let state = session.device_mut(Device::from(kind));
        state.violation = triggered;
        if triggered {
            state.violation_at = Some(Instant::now());
            tracing::info!(
                %id, user_id = %session.user_id, %kind,
                "violation triggered"
            );
        } else {
            tracing::info!(
                %id, user_id = %session.user_id, %kind,
                "violation resolved"
            );
        }
        Ok(())
    }

    /// Removes a session at disconnect. Returns the record if one existed.
    pub fn remove(&mut self, id: SessionId) -> Option<StudentSession> {
        let removed = self.sessions.remove(&id);
        if let Some(session) = &removed {
            tracing::info!(
                %id, user_id = %session.user_id,
                "session removed"
            );
        }
        removed
    }

    /// Looks up a session by id.
    pub fn get(&self, id: SessionId) -> Option<&StudentSession> {
        self.sessions.get(&id)
    }

    /// Builds the wire snapshot for a session.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn snapshot(
        &self,
        id: SessionId,
    ) -> Result<StudentSnapshot, SessionError> {
        self.sessions
            .get(&id)
            .map(StudentSession::snapshot)
            .ok_or(SessionError::NotFound(id))
    }

    /// Iterates over all sessions mutably. Used by the rule scanner.
    pub fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (&SessionId, &mut StudentSession)> {
        self.sessions.iter_mut()
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(PointsConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionStore`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! # Testing time-dependent behavior
    //!
    //! The point award depends on elapsed time since the violation was
    //! flagged. Instead of sleeping through real two-minute windows, the
    //! tests pick the window:
    //!   - `quick_window_secs: 3600` → any correction counts as quick
    //!   - `quick_window_secs: 0` → any measurable delay counts as late
    //!
    //! This keeps the tests fast and deterministic.

    use super::*;

    // -- Helpers ----------------------------------------------------------

    /// A store where every correction lands inside the quick window.
    fn store_with_long_window() -> SessionStore {
        SessionStore::new(PointsConfig {
            quick_window_secs: 3600,
            ..PointsConfig::default()
        })
    }

    /// A store where the quick window is already over.
    fn store_with_zero_window() -> SessionStore {
        SessionStore::new(PointsConfig {
            quick_window_secs: 0,
            ..PointsConfig::default()
        })
    }

    /// Shorthand for creating a `SessionId`.
    fn sid(id: u64) -> SessionId {
        SessionId(id)
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[test]
    fn test_login_creates_clean_session() {
        let mut store = store_with_long_window();

        let session = store.login(sid(1), "ada");

        assert_eq!(session.user_id, "ada");
        assert!(!session.charger.on);
        assert!(!session.lights.on);
        assert_eq!(session.points_total, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_login_again_replaces_session() {
        // A second login on the same connection starts a fresh record —
        // accumulated points and device state do not carry over.
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Charger, true).unwrap();

        let session = store.login(sid(1), "grace");

        assert_eq!(session.user_id, "grace");
        assert!(!session.charger.on);
        assert_eq!(store.len(), 1);
    }

    // =====================================================================
    // set_device() — on/off and the timestamp invariant
    // =====================================================================

    #[test]
    fn test_set_device_on_stamps_timestamp() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");

        let award =
            store.set_device(sid(1), Device::Charger, true).unwrap();

        assert!(award.is_none(), "turning on never awards points");
        let state = &store.get(sid(1)).unwrap().charger;
        assert!(state.on);
        assert!(
            state.turned_on_at.is_some(),
            "timestamp must be Some while the device is on"
        );
    }

    #[test]
    fn test_set_device_off_clears_timestamp() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Lights, true).unwrap();

        store.set_device(sid(1), Device::Lights, false).unwrap();

        let state = &store.get(sid(1)).unwrap().lights;
        assert!(!state.on);
        assert!(
            state.turned_on_at.is_none(),
            "timestamp must be None while the device is off"
        );
    }

    #[test]
    fn test_set_device_unknown_session_returns_not_found() {
        let mut store = store_with_long_window();

        let result = store.set_device(sid(99), Device::Charger, true);

        assert!(
            matches!(result, Err(SessionError::NotFound(id)) if id == sid(99))
        );
    }

    #[test]
    fn test_set_device_devices_are_independent() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");

        store.set_device(sid(1), Device::Charger, true).unwrap();

        let session = store.get(sid(1)).unwrap();
        assert!(session.charger.on);
        assert!(!session.lights.on, "lights must be untouched");
    }

    // =====================================================================
    // set_device() — point awards
    // =====================================================================

    #[test]
    fn test_set_device_off_within_window_awards_quick_points() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Charger, true).unwrap();
        store
            .report_violation(sid(1), ViolationKind::ChargerDuration, true)
            .unwrap();

        let award = store
            .set_device(sid(1), Device::Charger, false)
            .unwrap()
            .expect("flagged violation should award points");

        assert_eq!(award.points, 10);
        assert!(award.quick);
        assert_eq!(award.total, 10);
        assert_eq!(award.today, 10);
    }

    #[test]
    fn test_set_device_off_after_window_awards_base_points() {
        let mut store = store_with_zero_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Lights, true).unwrap();
        store
            .report_violation(sid(1), ViolationKind::LightsDaytime, true)
            .unwrap();
        // Let a measurable moment pass so the zero-length window is over.
        std::thread::sleep(std::time::Duration::from_millis(2));

        let award = store
            .set_device(sid(1), Device::Lights, false)
            .unwrap()
            .expect("flagged violation should award points");

        assert_eq!(award.points, 5);
        assert!(!award.quick);
    }

    #[test]
    fn test_set_device_off_without_violation_awards_nothing() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Charger, true).unwrap();

        let award =
            store.set_device(sid(1), Device::Charger, false).unwrap();

        assert!(award.is_none());
        assert_eq!(store.get(sid(1)).unwrap().points_total, 0);
    }

    #[test]
    fn test_set_device_off_accumulates_both_totals() {
        // Two corrected violations add up in both lifetime and daily totals.
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");

        store.set_device(sid(1), Device::Charger, true).unwrap();
        store
            .report_violation(sid(1), ViolationKind::ChargerDuration, true)
            .unwrap();
        store.set_device(sid(1), Device::Charger, false).unwrap();

        store.set_device(sid(1), Device::Lights, true).unwrap();
        store
            .report_violation(sid(1), ViolationKind::LightsDaytime, true)
            .unwrap();
        let award = store
            .set_device(sid(1), Device::Lights, false)
            .unwrap()
            .unwrap();

        assert_eq!(award.total, 20);
        assert_eq!(award.today, 20);
        let session = store.get(sid(1)).unwrap();
        assert_eq!(session.points_total, 20);
        assert_eq!(session.points_today, 20);
    }

    #[test]
    fn test_set_device_off_keeps_violation_flag() {
        // The award path clears only the on/timestamp fields; the flag is
        // cleared by the resolve path.
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Charger, true).unwrap();
        store
            .report_violation(sid(1), ViolationKind::ChargerDuration, true)
            .unwrap();

        store.set_device(sid(1), Device::Charger, false).unwrap();

        assert!(store.get(sid(1)).unwrap().charger.violation);
    }

    // =====================================================================
    // report_violation()
    // =====================================================================

    #[test]
    fn test_report_violation_trigger_sets_flag_and_stamp() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");

        store
            .report_violation(sid(1), ViolationKind::ChargerDuration, true)
            .unwrap();

        let state = &store.get(sid(1)).unwrap().charger;
        assert!(state.violation);
        assert!(state.violation_at.is_some());
    }

    #[test]
    fn test_report_violation_resolve_clears_flag_only() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store
            .report_violation(sid(1), ViolationKind::LightsDaytime, true)
            .unwrap();

        store
            .report_violation(sid(1), ViolationKind::LightsDaytime, false)
            .unwrap();

        let state = &store.get(sid(1)).unwrap().lights;
        assert!(!state.violation);
        assert!(
            state.violation_at.is_some(),
            "resolve leaves the last trigger stamp in place"
        );
    }

    #[test]
    fn test_report_violation_unknown_session_returns_not_found() {
        let mut store = store_with_long_window();

        let result = store.report_violation(
            sid(42),
            ViolationKind::ChargerDuration,
            true,
        );

        assert!(
            matches!(result, Err(SessionError::NotFound(id)) if id == sid(42))
        );
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[test]
    fn test_remove_deletes_session() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");

        let removed = store.remove(sid(1));

        assert_eq!(removed.unwrap().user_id, "ada");
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_session_returns_none() {
        let mut store = store_with_long_window();
        assert!(store.remove(sid(7)).is_none());
    }

    #[test]
    fn test_events_after_remove_are_not_found() {
        // Disconnect removes the session; subsequent events for that
        // identity must be no-ops.
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.remove(sid(1));

        assert!(matches!(
            store.set_device(sid(1), Device::Charger, true),
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            store.report_violation(
                sid(1),
                ViolationKind::LightsDaytime,
                true
            ),
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            store.snapshot(sid(1)),
            Err(SessionError::NotFound(_))
        ));
    }

    // =====================================================================
    // snapshot() / len() / is_empty()
    // =====================================================================

    #[test]
    fn test_snapshot_reports_current_state() {
        let mut store = store_with_long_window();
        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Charger, true).unwrap();

        let snap = store.snapshot(sid(1)).unwrap();

        assert_eq!(snap.user_id, "ada");
        assert!(snap.charger_on);
        assert!(!snap.lights_on);
        assert_eq!(snap.eco_points_total, 0);
    }

    #[test]
    fn test_len_tracks_session_count() {
        let mut store = store_with_long_window();
        assert!(store.is_empty());

        store.login(sid(1), "ada");
        store.login(sid(2), "grace");

        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }

    // =====================================================================
    // Full lifecycle
    // =====================================================================

    #[test]
    fn test_full_lifecycle_login_violate_correct_disconnect() {
        // The whole classroom scenario: a student logs in, leaves the
        // charger on, gets flagged, corrects it quickly, earns the bonus,
        // then disconnects.
        let mut store = store_with_long_window();

        store.login(sid(1), "ada");
        store.set_device(sid(1), Device::Charger, true).unwrap();
        store
            .report_violation(sid(1), ViolationKind::ChargerDuration, true)
            .unwrap();

        let award = store
            .set_device(sid(1), Device::Charger, false)
            .unwrap()
            .unwrap();
        assert_eq!(award.points, 10);

        let snap = store.snapshot(sid(1)).unwrap();
        assert_eq!(snap.eco_points_total, 10);
        assert_eq!(snap.eco_points_today, 10);

        store.remove(sid(1));
        assert!(store.is_empty());
    }
}
