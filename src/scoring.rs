use serde::{Deserialize, Serialize};
use tracing::debug;

pub const METER_CAPACITY: u32 = 256;
/// Meter fill per multiplier level.
pub const LEVEL_WIDTH: u32 = 52;
pub const MAX_LEVEL: u32 = 5;

/// Lower bound on the efficiency ratio so a slow flight still earns something.
const MIN_EFFICIENCY: f64 = 0.1;

/// Match-wide score and multiplier meter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMeter {
    total: i64,
    meter_fill: u32,
}

impl ScoreMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn meter_fill(&self) -> u32 {
        self.meter_fill
    }

    /// Multiplier level, `1..=5`.
    pub fn level(&self) -> u32 {
        (1 + self.meter_fill / LEVEL_WIDTH).min(MAX_LEVEL)
    }

    /// One registration of a separation violation.
    pub fn apply_separation_penalty(&mut self) {
        self.meter_fill = self.meter_fill.saturating_sub(1);
    }

    pub fn apply_crash_penalty(&mut self, penalty: i64) {
        self.total -= penalty;
        debug!("[GAME] Crash penalty {}, score now {}", penalty, self.total);
    }

    /// Adds a flight's score at the current multiplier and then tops up the meter.
    /// Returns the points actually awarded.
    pub fn award_flight(&mut self, flight_score: u32, addition_to_multiplier: u32) -> i64 {
        let awarded = i64::from(flight_score) * i64::from(self.level());
        self.total += awarded;
        self.meter_fill = (self.meter_fill + addition_to_multiplier).min(METER_CAPACITY);
        awarded
    }
}

/// Score for a flight that left the airspace, scaled by how close it came to the optimal time.
pub fn flight_score(base_score: u32, optimal_time: f64, elapsed: f64) -> u32 {
    let efficiency = if elapsed > 0.0 && optimal_time.is_finite() {
        (optimal_time / elapsed).clamp(MIN_EFFICIENCY, 1.0)
    } else {
        1.0
    };
    (f64::from(base_score) * efficiency).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let mut meter = ScoreMeter::new();
        assert_eq!(meter.level(), 1);
        meter.award_flight(0, 52);
        assert_eq!(meter.level(), 2);
        meter.award_flight(0, 500);
        assert_eq!(meter.meter_fill(), METER_CAPACITY);
        assert_eq!(meter.level(), MAX_LEVEL);
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let mut meter = ScoreMeter::new();
        meter.apply_separation_penalty();
        assert_eq!(meter.meter_fill(), 0);
        meter.award_flight(0, 2);
        meter.apply_separation_penalty();
        assert_eq!(meter.meter_fill(), 1);
    }

    #[test]
    fn test_award_uses_level_before_top_up() {
        let mut meter = ScoreMeter::new();
        assert_eq!(meter.award_flight(60, 64), 60);
        assert_eq!(meter.level(), 2);
        assert_eq!(meter.award_flight(60, 64), 120);
        assert_eq!(meter.total(), 180);
    }

    #[test]
    fn test_flight_score() {
        assert_eq!(flight_score(60, 100.0, 100.0), 60);
        assert_eq!(flight_score(60, 100.0, 50.0), 60);
        assert_eq!(flight_score(60, 100.0, 200.0), 30);
        assert_eq!(flight_score(60, 1.0, 1000.0), 6);
        assert_eq!(flight_score(150, 10.0, 0.0), 150);
    }

    #[test]
    fn test_crash_penalty() {
        let mut meter = ScoreMeter::new();
        meter.apply_crash_penalty(400);
        assert_eq!(meter.total(), -400);
    }
}
