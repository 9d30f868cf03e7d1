use tracing::{error, warn};

use super::{Aircraft, AircraftId};
use crate::scoring::ScoreMeter;
use crate::utils::Vector;

/// Two aircraft closer than this have collided.
pub const CRASH_RADIUS: f64 = 16.0;

/// Position snapshot of one aircraft, taken once per separation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: AircraftId,
    pub position: Vector,
    pub finished: bool,
}

impl Contact {
    pub fn of(aircraft: &Aircraft) -> Self {
        Self {
            id: aircraft.id(),
            position: aircraft.position(),
            finished: aircraft.is_finished(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    Clear,
    Violation,
    Crash,
}

/// Classifies a 3-D distance. Altitude counts in feet, so different bands never conflict.
pub fn classify(distance: f64, minimum_separation: f64) -> Proximity {
    if distance < CRASH_RADIUS {
        Proximity::Crash
    } else if distance < minimum_separation {
        Proximity::Violation
    } else {
        Proximity::Clear
    }
}

/// Per-aircraft separation bookkeeping: who is too near this tick, and the warning edge.
#[derive(Debug, Clone, Default)]
pub struct SeparationMonitor {
    too_near: Vec<AircraftId>,
    warning_active: bool,
    warning_cue: bool,
}

impl SeparationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks one aircraft against every live contact.
    ///
    /// Returns the first contact inside the crash radius, in contact order. Every contact
    /// inside the minimum separation is recorded and costs one penalty on `meter`.
    pub fn check(
        &mut self,
        own: &Contact,
        minimum_separation: f64,
        contacts: &[Contact],
        meter: &mut ScoreMeter,
    ) -> Option<AircraftId> {
        self.too_near.clear();

        for contact in contacts {
            if contact.id == own.id || contact.finished {
                continue;
            }

            let distance = own.position.distance_squared(&contact.position).sqrt();
            match classify(distance, minimum_separation) {
                Proximity::Crash => return Some(contact.id),
                Proximity::Violation => {
                    self.too_near.push(contact.id);
                    meter.apply_separation_penalty();
                }
                Proximity::Clear => {}
            }
        }

        if self.too_near.is_empty() {
            self.warning_active = false;
        } else if !self.warning_active {
            self.warning_active = true;
            self.warning_cue = true;
        }
        None
    }

    pub fn too_near(&self) -> &[AircraftId] {
        &self.too_near
    }

    pub fn is_violating(&self) -> bool {
        !self.too_near.is_empty()
    }

    /// True once per violation episode. Reading it consumes the cue.
    pub fn take_warning_cue(&mut self) -> bool {
        std::mem::take(&mut self.warning_cue)
    }

    pub fn clear(&mut self) {
        self.too_near.clear();
        self.warning_active = false;
        self.warning_cue = false;
    }
}

/// Runs every live aircraft's collision check against the whole set, in slice order.
///
/// A violating pair is registered from both sides. The first crash found ends the pass and
/// both aircraft involved are marked crashed.
pub fn run_separation_pass(
    aircraft: &mut [Aircraft],
    meter: &mut ScoreMeter,
) -> Option<(AircraftId, AircraftId)> {
    let contacts: Vec<Contact> = aircraft.iter().map(Contact::of).collect();

    for index in 0..aircraft.len() {
        if aircraft[index].is_finished() {
            continue;
        }

        if let Some(other) = aircraft[index].update_collisions(&contacts, meter) {
            let id = aircraft[index].id();
            if let Some(victim) = aircraft.iter_mut().find(|a| a.id() == other) {
                victim.mark_crashed();
            }
            error!("[SEPARATION] {} collided with {}", id, other);
            return Some((id, other));
        }

        if aircraft[index].separation().is_violating() {
            let plane = &aircraft[index];
            warn!(
                "[SEPARATION] {} too near {} aircraft",
                plane.name(),
                plane.separation().too_near().len()
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: u64, x: f64, y: f64, z: f64) -> Contact {
        Contact {
            id: AircraftId(id),
            position: Vector::new(x, y, z),
            finished: false,
        }
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0, 64.0), Proximity::Crash);
        assert_eq!(classify(15.9, 64.0), Proximity::Crash);
        assert_eq!(classify(16.0, 64.0), Proximity::Violation);
        assert_eq!(classify(63.9, 64.0), Proximity::Violation);
        assert_eq!(classify(64.0, 64.0), Proximity::Clear);
    }

    #[test]
    fn test_ignores_self_and_finished() {
        let own = contact(1, 100.0, 100.0, 28000.0);
        let mut gone = contact(2, 100.0, 100.0, 28000.0);
        gone.finished = true;

        let mut monitor = SeparationMonitor::new();
        let mut meter = ScoreMeter::new();
        assert_eq!(monitor.check(&own, 64.0, &[own, gone], &mut meter), None);
        assert!(!monitor.is_violating());
    }

    #[test]
    fn test_first_crash_wins() {
        let own = contact(1, 100.0, 100.0, 28000.0);
        let contacts = [own, contact(2, 105.0, 100.0, 28000.0), contact(3, 100.0, 100.0, 28000.0)];

        let mut monitor = SeparationMonitor::new();
        let mut meter = ScoreMeter::new();
        assert_eq!(monitor.check(&own, 64.0, &contacts, &mut meter), Some(AircraftId(2)));
    }

    #[test]
    fn test_altitude_separates() {
        let own = contact(1, 100.0, 100.0, 28000.0);
        let contacts = [own, contact(2, 100.0, 100.0, 30000.0)];

        let mut monitor = SeparationMonitor::new();
        let mut meter = ScoreMeter::new();
        assert_eq!(monitor.check(&own, 128.0, &contacts, &mut meter), None);
        assert!(monitor.too_near().is_empty());
    }

    #[test]
    fn test_warning_cue_rising_edge() {
        let own = contact(1, 100.0, 100.0, 28000.0);
        let near = [own, contact(2, 140.0, 100.0, 28000.0)];
        let far = [own, contact(2, 400.0, 100.0, 28000.0)];

        let mut monitor = SeparationMonitor::new();
        let mut meter = ScoreMeter::new();

        monitor.check(&own, 64.0, &near, &mut meter);
        assert!(monitor.take_warning_cue());
        assert!(!monitor.take_warning_cue());

        monitor.check(&own, 64.0, &near, &mut meter);
        assert!(!monitor.take_warning_cue());

        monitor.check(&own, 64.0, &far, &mut meter);
        assert!(!monitor.is_violating());

        monitor.check(&own, 64.0, &near, &mut meter);
        assert!(monitor.take_warning_cue());
    }
}
