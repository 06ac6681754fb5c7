//! Simulated campus sustainability metrics.
//!
//! There is no real building telemetry behind the classroom demo — the
//! broadcast loop asks this crate for a fresh [`CampusReading`] on every
//! interval and fans it out to the connected dashboards. Each metric is
//! drawn uniformly from a fixed, documented range so the charts look alive
//! without ever leaving plausible territory.

use ecopulse_protocol::CampusReading;
use rand::Rng;

/// Inclusive bounds for campus energy usage, in kWh.
pub const ENERGY_USAGE_RANGE: (u32, u32) = (2_000, 7_000);
/// Inclusive bounds for solar generation, in kWh.
pub const SOLAR_GENERATION_RANGE: (u32, u32) = (1_000, 4_000);
/// Inclusive bounds for waste container fill level, in percent.
pub const WASTE_LEVEL_RANGE: (u32, u32) = (20, 100);
/// Inclusive bounds for the composite carbon score.
pub const CARBON_SCORE_RANGE: (u32, u32) = (60, 100);

/// Generates bounded-random campus readings.
///
/// Stateless — each call to [`generate`](Self::generate) is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CampusSimulator;

impl CampusSimulator {
    /// Creates a new simulator.
    pub fn new() -> Self {
        Self
    }

    /// Produces one reading, each metric uniform within its range.
    pub fn generate(&self) -> CampusReading {
        let mut rng = rand::rng();
        CampusReading {
            energy_usage: rng
                .random_range(ENERGY_USAGE_RANGE.0..=ENERGY_USAGE_RANGE.1),
            solar_generation: rng.random_range(
                SOLAR_GENERATION_RANGE.0..=SOLAR_GENERATION_RANGE.1,
            ),
            waste_level: rng
                .random_range(WASTE_LEVEL_RANGE.0..=WASTE_LEVEL_RANGE.1),
            carbon_score: rng
                .random_range(CARBON_SCORE_RANGE.0..=CARBON_SCORE_RANGE.1),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
