//! Server-side rule scanning for EcoPulse.
//!
//! Clients detect violations on their own and report them, but the server
//! does not trust that path alone: every scan interval the [`RuleEngine`]
//! walks the whole session store and flags violations itself.
//!
//! Two rules exist, one per device:
//!
//! - **Charger duration** — the charger has been on longer than the limit.
//!   Duration-based, measured from the device's `turned_on_at` stamp.
//! - **Lights daytime** — the lights are on during restricted daytime
//!   hours. Time-of-day-based, evaluated against the local hour the caller
//!   passes in (so tests never depend on when they run).
//!
//! Scanning only ever flags; resolution comes from the client's report
//! path or is implicit in the point award when the device goes off.

use std::time::{Duration, Instant};

use ecopulse_protocol::{SessionId, ViolationKind};
use ecopulse_session::SessionStore;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for the two device rules.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// How long (in seconds) the charger may stay on before it is flagged.
    /// Default: 180 seconds.
    pub charger_limit_secs: u64,

    /// First hour (inclusive, local time) of the restricted daytime window
    /// for lights. Default: 6.
    pub daytime_start_hour: u32,

    /// End hour (exclusive, local time) of the restricted window.
    /// Default: 18.
    pub daytime_end_hour: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            charger_limit_secs: 180,
            daytime_start_hour: 6,
            daytime_end_hour: 18,
        }
    }
}

impl RuleConfig {
    /// The charger duration limit as a `Duration`.
    pub fn charger_limit(&self) -> Duration {
        Duration::from_secs(self.charger_limit_secs)
    }

    /// Whether the given local hour falls inside the restricted
    /// daytime window.
    pub fn is_daytime(&self, local_hour: u32) -> bool {
        (self.daytime_start_hour..self.daytime_end_hour)
            .contains(&local_hour)
    }
}

// ---------------------------------------------------------------------------
// Scan results
// ---------------------------------------------------------------------------

/// One newly flagged violation found by a scan.
///
/// The server turns each hit into an alert notification for that client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit {
    /// The session the violation belongs to.
    pub id: SessionId,
    /// The student's username (for log/notification text).
    pub user_id: String,
    /// Which rule was breached.
    pub kind: ViolationKind,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scans the session store for rule violations on a fixed interval.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: RuleConfig,
}

impl RuleEngine {
    /// Creates an engine with the given thresholds.
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Walks every session and flags violations that are not already
    /// flagged. Returns the newly flagged violations only — a device that
    /// was flagged on an earlier scan produces no further hits.
    ///
    /// `local_hour` is the current local hour (0–23); the caller supplies
    /// it so the daytime rule stays deterministic under test.
    pub fn scan(
        &self,
        store: &mut SessionStore,
        local_hour: u32,
    ) -> Vec<ScanHit> {
        let now = Instant::now();
        let daytime = self.config.is_daytime(local_hour);
        let mut hits = Vec::new();

        for (id, session) in store.iter_mut() {
            // Charger duration rule.
            let charger = &mut session.charger;
            if charger.on && !charger.violation {
                if let Some(turned_on) = charger.turned_on_at {
                    if now.duration_since(turned_on)
                        > self.config.charger_limit()
                    {
                        charger.violation = true;
                        charger.violation_at = Some(now);
                        hits.push(ScanHit {
                            id: *id,
                            user_id: session.user_id.clone(),
                            kind: ViolationKind::ChargerDuration,
                        });
                        tracing::info!(
                            %id,
                            user_id = %session.user_id,
                            "charger duration violation flagged"
                        );
                    }
                }
            }

            // Lights daytime rule.
            let lights = &mut session.lights;
            if lights.on && !lights.violation && daytime {
                lights.violation = true;
                lights.violation_at = Some(now);
                hits.push(ScanHit {
                    id: *id,
                    user_id: session.user_id.clone(),
                    kind: ViolationKind::LightsDaytime,
                });
                tracing::info!(
                    %id,
                    user_id = %session.user_id,
                    "lights daytime violation flagged"
                );
            }
        }

        hits
    }
}

// =========================================================================
// Tests
// =========================================================================
